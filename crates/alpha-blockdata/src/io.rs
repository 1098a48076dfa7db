pub use std::io::{Cursor, Error, ErrorKind, Read, Write};
