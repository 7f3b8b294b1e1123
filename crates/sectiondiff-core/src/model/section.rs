//! Item and Section models

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::Hash;

use crate::model::identity::{Identifiable, ValueEq};

/// A single entry of a section: an identity plus an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<I, V> {
    #[serde(rename = "id")]
    pub identity: I,
    pub value: V,
}

impl<I, V> Item<I, V> {
    pub fn new(identity: I, value: V) -> Self {
        Self { identity, value }
    }
}

impl<I, V> Identifiable for Item<I, V>
where
    I: Clone + Eq + Hash + Display,
{
    type Identity = I;

    fn identity(&self) -> &I {
        &self.identity
    }
}

impl<I, V: PartialEq> ValueEq for Item<I, V> {
    fn value_eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// An ordered group of items under a header.
///
/// Order of `items` is display order and is part of what a diff reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section<I, H, V> {
    #[serde(rename = "id")]
    pub identity: I,
    #[serde(default)]
    pub header: H,
    #[serde(default = "Vec::new")]
    pub items: Vec<Item<I, V>>,
}

impl<I, H, V> Section<I, H, V> {
    pub fn new(identity: I, header: H, items: Vec<Item<I, V>>) -> Self {
        Self {
            identity,
            header,
            items,
        }
    }
}

impl<I, H, V> Identifiable for Section<I, H, V>
where
    I: Clone + Eq + Hash + Display,
{
    type Identity = I;

    fn identity(&self) -> &I {
        &self.identity
    }
}

/// Sections compare by header only; items are diffed individually.
impl<I, H: PartialEq, V> ValueEq for Section<I, H, V> {
    fn value_eq(&self, other: &Self) -> bool {
        self.header == other.header
    }
}
