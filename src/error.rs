use thiserror::Error;

/// Errors raised by the menu runtime.
///
/// `StackFull`, `PopRoot`, `NotAFolder`, `NoSuchItem` and `WrongKind` are
/// caller bugs and are logged at error level where they are produced. The
/// rest are runtime conditions that the dispatcher turns into dialogs.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu stack is full ({0} levels)")]
    StackFull(usize),
    #[error("tried to pop the root menu")]
    PopRoot,
    #[error("item {0} is not a folder")]
    NotAFolder(usize),
    #[error("no item {0} in this menu")]
    NoSuchItem(usize),
    #[error("item {0} has the wrong kind for this operation")]
    WrongKind(usize),
    #[error("unknown machine class '{0}'")]
    UnknownMachine(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("emulator: {0}")]
    Emulator(String),
}

pub type Result<T> = std::result::Result<T, MenuError>;
