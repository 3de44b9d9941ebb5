use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use cipher_tunnel_core::prelude::Device;
use cipher_tunnel_instruments::OutputFormat;

/// Key size used by every scenario.
pub const DEFAULT_KEY_SIZE: KeySize = KeySize::Bits192;

/// Password used by every scenario.
pub const DEFAULT_PASSWORD: &str = "hola cola";

/// The executables the harness knows how to build and drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherTool {
    /// The parallel implementation under test.
    Parallel,
    /// The serial implementation used as a correctness oracle.
    Reference,
}

impl CipherTool {
    pub fn binary_name(&self) -> &'static str {
        match self {
            CipherTool::Parallel => "paes",
            CipherTool::Reference => "aes",
        }
    }

    pub fn grammar(&self) -> ArgGrammar {
        match self {
            CipherTool::Parallel => ArgGrammar::Flags,
            CipherTool::Reference => ArgGrammar::Positional,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        match self {
            CipherTool::Parallel => OutputFormat::Parallel,
            CipherTool::Reference => OutputFormat::Reference,
        }
    }

    /// Extensions of auxiliary files that must sit next to the binary, e.g. OpenCL kernels.
    pub fn auxiliary_extensions(&self) -> &'static [&'static str] {
        match self {
            CipherTool::Parallel => &["cl"],
            CipherTool::Reference => &[],
        }
    }
}

impl Display for CipherTool {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.binary_name().to_uppercase())
    }
}

/// A restricted stage of the cipher pipeline that can be selected at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationVariant {
    ShiftRows,
    SubBytes,
    MixColumns,
    AddRoundKey,
    /// The unrestricted pipeline.
    Full,
}

impl OperationVariant {
    pub const ALL: [OperationVariant; 5] = [
        OperationVariant::ShiftRows,
        OperationVariant::SubBytes,
        OperationVariant::MixColumns,
        OperationVariant::AddRoundKey,
        OperationVariant::Full,
    ];

    /// The preprocessor definition that selects this variant, if any.
    pub fn define(&self) -> Option<&'static str> {
        match self {
            OperationVariant::ShiftRows => Some("SHIFT_ROWS"),
            OperationVariant::SubBytes => Some("SUB_BYTES"),
            OperationVariant::MixColumns => Some("MIX_COLUMNS"),
            OperationVariant::AddRoundKey => Some("ADD_ROUND_KEY"),
            OperationVariant::Full => None,
        }
    }
}

impl Display for OperationVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationVariant::ShiftRows => "ShiftRows",
            OperationVariant::SubBytes => "SubBytes",
            OperationVariant::MixColumns => "MixColumns",
            OperationVariant::AddRoundKey => "AddRoundKey",
            OperationVariant::Full => "AES",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Encrypt, Mode::Decrypt];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Encrypt => "encrypt",
            Mode::Decrypt => "decrypt",
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Bits128,
    Bits192,
    Bits256,
}

impl KeySize {
    pub fn bits(&self) -> u16 {
        match self {
            KeySize::Bits128 => 128,
            KeySize::Bits192 => 192,
            KeySize::Bits256 => 256,
        }
    }
}

/// How a tool expects its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgGrammar {
    /// `-i <in> -o <out> -m <mode> -k <bits> -p <password> -d <device>`
    Flags,
    /// `<mode> <in> <out> <bits> <password>`
    Positional,
}

/// One encryption or decryption of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherRequest {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: Mode,
    pub key_size: KeySize,
    pub password: String,
}

impl CipherRequest {
    /// A request using [DEFAULT_KEY_SIZE] and [DEFAULT_PASSWORD].
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>, mode: Mode) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            mode,
            key_size: DEFAULT_KEY_SIZE,
            password: DEFAULT_PASSWORD.to_string(),
        }
    }

    pub fn with_key_size(mut self, key_size: KeySize) -> Self {
        self.key_size = key_size;
        self
    }

    pub fn with_password(mut self, password: &str) -> Self {
        self.password = password.to_string();
        self
    }

    /// Render the arguments for `grammar`. Only the flag grammar carries the device.
    pub fn to_args(&self, grammar: ArgGrammar, device: Device) -> Vec<OsString> {
        match grammar {
            ArgGrammar::Flags => vec![
                "-i".into(),
                self.input.clone().into_os_string(),
                "-o".into(),
                self.output.clone().into_os_string(),
                "-m".into(),
                self.mode.as_str().into(),
                "-k".into(),
                self.key_size.bits().to_string().into(),
                "-p".into(),
                self.password.clone().into(),
                "-d".into(),
                device.as_str().into(),
            ],
            ArgGrammar::Positional => vec![
                self.mode.as_str().into(),
                self.input.clone().into_os_string(),
                self.output.clone().into_os_string(),
                self.key_size.bits().to_string().into(),
                self.password.clone().into(),
            ],
        }
    }
}
