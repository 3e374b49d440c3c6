//! # Visitors State
//!
//! The live visitor set, the pending payment and the day's history, all
//! behind one lock so a payment or a day close is never observed half done.

use std::sync::{Arc, Mutex, PoisonError};

use lounge_core::VisitorBook;

/// Console-managed visitor book.
#[derive(Debug, Clone, Default)]
pub struct VisitorsState {
    book: Arc<Mutex<VisitorBook>>,
}

impl VisitorsState {
    pub fn new() -> Self {
        VisitorsState {
            book: Arc::new(Mutex::new(VisitorBook::new())),
        }
    }

    /// Executes a function with read access to the book.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let closable = visitors.with_book(|book| book.can_close_day());
    /// ```
    pub fn with_book<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&VisitorBook) -> R,
    {
        let book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        f(&book)
    }

    /// Executes a function with write access to the book.
    pub fn with_book_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut VisitorBook) -> R,
    {
        let mut book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut book)
    }
}
