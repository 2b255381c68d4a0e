use serde::Serialize;

use crate::api::ApiError;

/// One independently fetched section of a dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel<T> {
    Ready(T),
    Failed(String),
}

impl<T> Panel<T> {
    pub fn from_result(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(value) => Panel::Ready(value),
            Err(error) => Panel::Failed(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Panel::Failed(_))
    }
}

impl<T> Panel<Vec<T>> {
    pub fn items(&self) -> &[T] {
        match self {
            Panel::Ready(items) => items,
            Panel::Failed(_) => &[],
        }
    }

    /// Replaces the first matching entry; returns whether one matched
    pub fn replace(&mut self, matches: impl Fn(&T) -> bool, item: T) -> bool {
        if let Panel::Ready(items) = self {
            if let Some(slot) = items.iter_mut().find(|entry| matches(entry)) {
                *slot = item;
                return true;
            }
        }
        false
    }

    /// Replaces the matching entry or appends when none matches
    pub fn upsert(&mut self, matches: impl Fn(&T) -> bool, item: T) {
        if let Panel::Ready(items) = self {
            match items.iter_mut().find(|entry| matches(entry)) {
                Some(slot) => *slot = item,
                None => items.push(item),
            }
        }
    }

    pub fn remove(&mut self, matches: impl Fn(&T) -> bool) -> usize {
        match self {
            Panel::Ready(items) => {
                let before = items.len();
                items.retain(|entry| !matches(entry));
                before - items.len()
            }
            Panel::Failed(_) => 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if let Panel::Ready(items) = self {
            items.push(item);
        }
    }
}
