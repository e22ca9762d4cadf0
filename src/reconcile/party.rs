//! Supplier / TradingPartnerName exclusion within one component.
//!
//! A trading partner always wins: a Supplier seen after an accepted trading
//! partner is skipped, and a trading partner seen after an accepted Supplier
//! retracts it. State resets for every component.

use crate::ir::types::QualifiedRef;
use crate::parse::types::{FieldId, Party};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartyDecision {
    Accept,
    /// Skip this occurrence.
    Exclude,
    /// Accept this occurrence and retract every earlier Supplier.
    Supersede(Vec<(FieldId, QualifiedRef)>),
}

#[derive(Debug, Default)]
pub struct PartyState {
    suppliers: Vec<(FieldId, QualifiedRef)>,
    trading_partner: bool,
}

impl PartyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what to do with an occurrence and record it as accepted unless excluded.
    pub fn admit(&mut self, party: Party, field_id: &str, reference: &QualifiedRef) -> PartyDecision {
        match party {
            Party::None => PartyDecision::Accept,
            Party::Supplier if self.trading_partner => PartyDecision::Exclude,
            Party::Supplier => {
                self.suppliers.push((field_id.to_string(), reference.clone()));
                PartyDecision::Accept
            }
            Party::TradingPartner => {
                self.trading_partner = true;
                if self.suppliers.is_empty() {
                    PartyDecision::Accept
                } else {
                    PartyDecision::Supersede(std::mem::take(&mut self.suppliers))
                }
            }
        }
    }
}
