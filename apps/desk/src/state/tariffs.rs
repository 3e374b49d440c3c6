//! # Tariffs State

use std::sync::{Arc, Mutex, PoisonError};

use lounge_core::TariffBook;

/// Console-managed tariff catalogue.
#[derive(Debug, Clone)]
pub struct TariffsState {
    book: Arc<Mutex<TariffBook>>,
}

impl TariffsState {
    pub fn new(book: TariffBook) -> Self {
        TariffsState {
            book: Arc::new(Mutex::new(book)),
        }
    }

    pub fn with_tariffs<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&TariffBook) -> R,
    {
        let book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        f(&book)
    }

    pub fn with_tariffs_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut TariffBook) -> R,
    {
        let mut book = self.book.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut book)
    }
}

impl Default for TariffsState {
    fn default() -> Self {
        Self::new(TariffBook::with_defaults())
    }
}
