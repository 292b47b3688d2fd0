mod error_entries;
mod ll1;
mod token;
mod tree;

pub use self::error_entries::{ErrorEntries, ANY_TOKEN};
pub use self::ll1::Parser;
pub use self::token::{Location, Token, TokenKind};
pub use self::tree::{Child, ChildOutput, NodeId, NodeOutput, ParseNode, ParseTree};
