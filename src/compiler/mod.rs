//! Solidity compilation subsystem.
//!
//! # Data Flow
//! ```text
//! source.rs (read .sol file)
//!     → input.rs (standard JSON request)
//!     → solc.rs (svm-installed solc, behind the Compiler trait)
//!     → output.rs (diagnostics, CompiledArtifact)
//!     → artifact.rs (full response written to disk)
//! ```

pub mod artifact;
pub mod input;
pub mod output;
pub mod solc;
pub mod source;

pub use artifact::{read_artifact, write_artifact};
pub use input::CompilerInput;
pub use output::{CompiledArtifact, CompilerOutput};
pub use solc::{Compiler, SvmSolc};
pub use source::{load_source, ContractSource};
