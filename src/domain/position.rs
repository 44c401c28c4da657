//! Broker-reported holding for the traded symbol.

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
    pub average_cost: f64,
}

impl Position {
    pub fn flat(symbol: &str) -> Self {
        Position {
            symbol: symbol.to_string(),
            quantity: 0.0,
            average_cost: 0.0,
        }
    }

    pub fn is_held(&self) -> bool {
        self.quantity > 0.0
    }
}
