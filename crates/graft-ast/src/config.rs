/// Tunables of the synchronization engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// How many times `repair` prints and reparses before it gives up on
    /// parenthesizing and resynchronizes the remaining subtrees.
    pub repair_passes: usize,
    /// Added to the enclosing indentation for statements of a block that have
    /// no whitespace of their own.
    pub block_indent: String,
    /// Added to the statement indentation for continuation lines of rendered
    /// documentation.
    pub doc_indent: String,
    /// Print whitespace recorded in the tree as it is, even where the
    /// printer would otherwise normalize it. Invalid nodes are always printed
    /// this way.
    pub verbatim: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repair_passes: 2,
            block_indent: "    ".to_owned(),
            doc_indent: "   ".to_owned(),
            verbatim: false,
        }
    }
}
