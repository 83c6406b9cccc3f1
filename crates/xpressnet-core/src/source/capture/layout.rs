pub const HEX_EXTENSIONS: [&str; 2] = ["hex", "txt"];
pub const HEX_COMMENT: char = '#';
pub const HEX_SEPARATORS: [char; 2] = [',', ';'];
pub const HEX_PREFIXES: [&str; 2] = ["0x", "0X"];
pub const HEX_TOKEN_MAX_DIGITS: usize = 2;
pub const READER_BUFFER_SIZE: usize = 8 * 1024;
