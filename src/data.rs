mod simtime;

pub use simtime::*;
