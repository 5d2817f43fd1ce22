pub use crate::*;
pub use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

pub use std::io::{Cursor, Read, Seek, SeekFrom, Write};
