mod envelope;
mod snapshot;
mod vuln;

pub use envelope::*;
pub use snapshot::*;
pub use vuln::*;
