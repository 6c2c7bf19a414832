#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentKind {
    Holding,
    Benchmark,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    pub symbol: String,
    pub kind: InstrumentKind,
}

impl Instrument {
    pub fn holding(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: InstrumentKind::Holding,
        }
    }

    pub fn benchmark(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: InstrumentKind::Benchmark,
        }
    }
}
