//! Per-endpoint accepted-error table (spec §3 `MirrorRequest`, §4.2
//! "Accepted errors").

use std::collections::HashMap;

use crate::types::path_labels::*;

/// `pathLabel -> set<httpStatus>` that should be treated as an empty result
/// rather than an error for that endpoint.
pub struct AcceptedErrorTable {
    by_label: HashMap<&'static str, Vec<u16>>,
}

impl AcceptedErrorTable {
    /// Builds the default table; `eth_call_accepted_errors` overrides the
    /// entry for the contract-call endpoint (spec §6
    /// `ETH_CALL_ACCEPTED_ERRORS`).
    pub fn new(eth_call_accepted_errors: &[u16]) -> Self {
        let mut by_label = HashMap::new();
        by_label.insert(ACCOUNTS, vec![404]);
        by_label.insert(BLOCKS_BY_ID, vec![404]);
        by_label.insert(BLOCKS, vec![404]);
        by_label.insert(CONTRACTS, vec![404]);
        by_label.insert(CONTRACT_RESULTS, vec![404]);
        by_label.insert(CONTRACT_RESULTS_LOGS, vec![404]);
        by_label.insert(CONTRACT_RESULT_ACTIONS, vec![404]);
        by_label.insert(CONTRACT_RESULT_OPCODES, vec![404]);
        by_label.insert(NETWORK_FEES, vec![404]);
        by_label.insert(NETWORK_EXCHANGE_RATE, vec![404]);
        by_label.insert(TOKENS, vec![404]);
        by_label.insert(TRANSACTIONS, vec![404]);
        by_label.insert(CONTRACT_STATE, vec![404]);
        // Contract call additionally treats 400 as "contract reverted", not
        // an error (spec §4.2).
        let mut call_accepted = eth_call_accepted_errors.to_vec();
        if !call_accepted.contains(&400) {
            call_accepted.push(400);
        }
        by_label.insert(CONTRACT_CALL, call_accepted);
        Self { by_label }
    }

    pub fn is_accepted(&self, path_label: &str, status: u16) -> bool {
        self.by_label.get(path_label).is_some_and(|set| set.contains(&status))
    }

    /// Whether `status` on `path_label` should be treated as a normal
    /// (non-error, non-logged) response, e.g. a reverted `eth_call`.
    pub fn is_silent(&self, path_label: &str, status: u16) -> bool {
        path_label == CONTRACT_CALL && status == 400 || self.is_accepted(path_label, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_404_is_accepted() {
        let table = AcceptedErrorTable::new(&[]);
        assert!(table.is_accepted(ACCOUNTS, 404));
        assert!(!table.is_accepted(ACCOUNTS, 500));
    }

    #[test]
    fn contract_call_always_accepts_400() {
        let table = AcceptedErrorTable::new(&[429]);
        assert!(table.is_accepted(CONTRACT_CALL, 400));
        assert!(table.is_accepted(CONTRACT_CALL, 429));
    }
}
