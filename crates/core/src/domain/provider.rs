// Provider registry
//
// Maps a provider tag to how its CLI is found and called. The prompt is
// either appended as the last argument or streamed over stdin.

use std::fmt;
use std::str::FromStr;

/// Known AI CLI families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderTag {
    Gemini,
    OpenCode,
    Mistral,
}

impl ProviderTag {
    pub const ALL: [ProviderTag; 3] = [Self::Gemini, Self::OpenCode, Self::Mistral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenCode => "opencode",
            Self::Mistral => "mistral",
        }
    }

    /// Capability descriptor for this provider
    pub fn spec(&self) -> &'static ProviderSpec {
        match self {
            Self::Gemini => &GEMINI,
            Self::OpenCode => &OPENCODE,
            Self::Mistral => &MISTRAL,
        }
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown provider: {}", s))
    }
}

/// How to find and call one provider's CLI
pub struct ProviderSpec {
    pub tag: ProviderTag,
    /// Executable file names, in preference order
    pub binary_names: &'static [&'static str],
    /// Prompt goes to stdin instead of the argument list
    pub uses_stdin: bool,
    build_arguments: fn(&str) -> Vec<String>,
}

impl ProviderSpec {
    /// Arguments selecting `model`, without the prompt
    pub fn base_arguments(&self, model: &str) -> Vec<String> {
        (self.build_arguments)(model)
    }

    /// Split a prompt into (arguments, stdin input) for `model`
    pub fn build_invocation(&self, model: &str, prompt: &str) -> (Vec<String>, Option<String>) {
        let mut args = self.base_arguments(model);
        if self.uses_stdin {
            (args, Some(prompt.to_string()))
        } else {
            args.push(prompt.to_string());
            (args, None)
        }
    }
}

impl fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("tag", &self.tag)
            .field("binary_names", &self.binary_names)
            .field("uses_stdin", &self.uses_stdin)
            .finish_non_exhaustive()
    }
}

static GEMINI: ProviderSpec = ProviderSpec {
    tag: ProviderTag::Gemini,
    binary_names: &["gemini"],
    uses_stdin: false,
    build_arguments: |model| vec!["-m".into(), model.into(), "--yolo".into()],
};

static OPENCODE: ProviderSpec = ProviderSpec {
    tag: ProviderTag::OpenCode,
    binary_names: &["opencode"],
    uses_stdin: true,
    build_arguments: |model| vec!["run".into(), "--model".into(), model.into()],
};

static MISTRAL: ProviderSpec = ProviderSpec {
    tag: ProviderTag::Mistral,
    binary_names: &["mistral-vibe"],
    uses_stdin: true,
    build_arguments: |model| vec!["run".into(), "--model".into(), model.into()],
};

/// A selectable model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Model {
    pub id: &'static str,
    pub display_name: &'static str,
    pub provider: ProviderTag,
}

impl Model {
    pub const CATALOGUE: &'static [Model] = &[
        Model::new("gemini-3-pro", "Gemini 3 Pro", ProviderTag::Gemini),
        Model::new("gemini-3-flash", "Gemini 3 Flash", ProviderTag::Gemini),
        Model::new("opencode/big-pickle", "Big Pickle", ProviderTag::OpenCode),
        Model::new("opencode/glm-4.7-free", "GLM-4.7", ProviderTag::OpenCode),
        Model::new("opencode/grok-code", "Grok Code Fast 1", ProviderTag::OpenCode),
        Model::new("opencode/minimax-m2.1-free", "MiniMax M2.1", ProviderTag::OpenCode),
        Model::new("mistral-vibe", "Mistral Vibe", ProviderTag::Mistral),
    ];

    const fn new(id: &'static str, display_name: &'static str, provider: ProviderTag) -> Self {
        Self {
            id,
            display_name,
            provider,
        }
    }

    pub fn find(id: &str) -> Option<&'static Model> {
        Self::CATALOGUE.iter().find(|model| model.id == id)
    }

    pub fn spec(&self) -> &'static ProviderSpec {
        self.provider.spec()
    }
}
