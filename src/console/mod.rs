//! Serial command console
//!
//! Lazy polling from the run loop - no dedicated task.
//! Zero heap allocation - all static buffers.

pub mod args;
#[allow(clippy::module_inception)]
pub mod console;
pub mod dispatch;
pub mod line_buffer;
pub mod parser;
pub mod registry;

pub use args::{parse_args, ArgValue, ArgValues};
pub use console::{Console, VERSION};
pub use dispatch::execute;
pub use line_buffer::LineBuffer;
pub use parser::{is_help, tokenize, Tokens};
pub use registry::{ClientInfo, CommandHandler, CommandInfo, Registry};
