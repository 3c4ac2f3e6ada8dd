use std::collections::HashMap;

/// Maps a label symbol to the byte offset of the instruction that follows its definition.
/// Owned by one `assemble` call.
pub type LabelMap = HashMap<String, u64>;
