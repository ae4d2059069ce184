// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator math over client-supplied candles. Inputs
// are never rejected; degenerate data yields a defined degenerate value.

pub mod atr;
