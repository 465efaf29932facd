use crate::contracts::bindings::TokenData;
use crate::error::{SetupError, TokenClass};
use alloy::primitives::Address;
use std::collections::HashMap;

/// Symbol -> address table. The first listing of a symbol wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    entries: HashMap<String, Address>,
}

impl SymbolTable {
    pub fn from_listing<'a>(listing: impl IntoIterator<Item = (&'a str, Address)>) -> Self {
        let mut entries = HashMap::new();
        for (symbol, address) in listing {
            entries.entry(symbol.to_string()).or_insert(address);
        }
        Self { entries }
    }

    pub fn get(&self, symbol: &str) -> Option<Address> {
        self.entries.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Wrapped-token and reserve symbol tables read from the data provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    wrapped: SymbolTable,
    reserves: SymbolTable,
}

impl AddressBook {
    pub fn new(wrapped: SymbolTable, reserves: SymbolTable) -> Self {
        Self { wrapped, reserves }
    }

    pub fn from_token_data(wrapped: &[TokenData], reserves: &[TokenData]) -> Self {
        let table = |listing: &[TokenData]| {
            SymbolTable::from_listing(
                listing
                    .iter()
                    .map(|token| (token.symbol.as_str(), token.tokenAddress)),
            )
        };
        Self::new(table(wrapped), table(reserves))
    }

    fn table(&self, class: TokenClass) -> &SymbolTable {
        match class {
            TokenClass::Wrapped => &self.wrapped,
            TokenClass::Reserve => &self.reserves,
        }
    }

    pub fn get(&self, class: TokenClass, symbol: &str) -> Option<Address> {
        self.table(class).get(symbol)
    }

    /// Resolve every symbol of `class` or report all the missing ones at once.
    pub fn require<const N: usize>(
        &self,
        class: TokenClass,
        symbols: [&str; N],
    ) -> Result<[Address; N], SetupError> {
        let table = self.table(class);
        let mut resolved = [Address::ZERO; N];
        let mut missing = Vec::new();
        for (slot, symbol) in resolved.iter_mut().zip(symbols) {
            match table.get(symbol) {
                Some(address) => *slot = address,
                None => missing.push(symbol.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(resolved)
        } else {
            Err(SetupError::MissingSymbols {
                class,
                symbols: missing,
            })
        }
    }
}
