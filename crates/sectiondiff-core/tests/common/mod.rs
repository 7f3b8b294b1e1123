use std::time::Duration;

use sectiondiff_core::coordinator::Presentation;
use sectiondiff_core::diff::{Changeset, ItemPath};
use sectiondiff_core::errors::ExError;
use sectiondiff_core::model::{Item, Section, Snapshot};
use sectiondiff_core::apply;

pub type TestSnapshot = Snapshot<String, String, i32>;
pub type TestChangeset = Changeset<String, String, i32>;

/// Build a section with an empty header from `(identity, value)` pairs
#[allow(dead_code)]
pub fn section(id: &str, items: &[(&str, i32)]) -> Section<String, String, i32> {
    section_with_header(id, "", items)
}

#[allow(dead_code)]
pub fn section_with_header(
    id: &str,
    header: &str,
    items: &[(&str, i32)],
) -> Section<String, String, i32> {
    Section::new(
        id.to_string(),
        header.to_string(),
        items
            .iter()
            .map(|(i, v)| Item::new(i.to_string(), *v))
            .collect(),
    )
}

#[allow(dead_code)]
pub fn snapshot(sections: Vec<Section<String, String, i32>>) -> TestSnapshot {
    Snapshot::new(sections)
}

/// Everything a presentation was asked to do, in order
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reload(TestSnapshot),
    Apply(TestChangeset),
    FadeOut(ItemPath, Duration),
    Error(String),
}

/// Presentation double that records every call and keeps its own displayed
/// state by replaying changesets with `apply`
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingPresentation {
    pub detached: bool,
    pub displayed: Option<TestSnapshot>,
    pub calls: Vec<Call>,
    pub errors: Vec<ExError>,
}

#[allow(dead_code)]
impl RecordingPresentation {
    pub fn reloads(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Reload(_)))
            .count()
    }

    pub fn applied(&self) -> Vec<&TestChangeset> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Apply(changeset) => Some(changeset),
                _ => None,
            })
            .collect()
    }
}

impl Presentation<String, String, i32> for RecordingPresentation {
    fn can_apply_incrementally(&self) -> bool {
        !self.detached
    }

    fn reload(&mut self, snapshot: &TestSnapshot) {
        self.displayed = Some(snapshot.clone());
        self.calls.push(Call::Reload(snapshot.clone()));
    }

    fn apply_changeset(&mut self, changeset: &TestChangeset) {
        let displayed = self
            .displayed
            .take()
            .expect("changeset applied before the first reload");
        self.displayed =
            Some(apply(&displayed, changeset).expect("changeset does not fit displayed state"));
        self.calls.push(Call::Apply(changeset.clone()));
    }

    fn begin_fade_out(&mut self, item: ItemPath, duration: Duration) {
        self.calls.push(Call::FadeOut(item, duration));
    }

    fn report_error(&mut self, error: &ExError) {
        self.calls.push(Call::Error(error.code().to_string()));
        self.errors.push(error.clone());
    }
}
