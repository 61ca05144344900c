use storefront_infra::{InMemoryLedgerStore, LedgerService};

/// The ledger service as wired for this process.
pub type WalletLedger = LedgerService<InMemoryLedgerStore>;

/// Process-wide service handles, injected into handlers via `Extension`.
///
/// The store handle is owned here (opened at process start, dropped at
/// shutdown) rather than living in a module-level singleton.
pub struct AppServices {
    ledger: WalletLedger,
}

impl AppServices {
    pub fn ledger(&self) -> &WalletLedger {
        &self.ledger
    }
}

pub fn build_services() -> AppServices {
    AppServices {
        ledger: LedgerService::new(InMemoryLedgerStore::new()),
    }
}
