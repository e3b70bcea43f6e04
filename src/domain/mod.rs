// Domain layer - Plain data and the rules that need no I/O
pub mod placefile;
pub mod state_vector;
