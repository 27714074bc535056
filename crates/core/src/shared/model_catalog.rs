const DEFAULT_MODEL_REPO: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";
const TINY_DIARIZE_REPO: &str =
    "https://huggingface.co/akashmjn/tinydiarize-whisper.cpp/resolve/main";

pub const DEFAULT_MODEL_ID: &str = "tiny";

/// A downloadable ggml Whisper model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelOption {
    pub id: &'static str,
    pub details: &'static str,
    pub source_repo: &'static str,
}

impl ModelOption {
    const fn new(id: &'static str, details: &'static str) -> Self {
        Self {
            id,
            details,
            source_repo: DEFAULT_MODEL_REPO,
        }
    }

    pub fn file_name(&self) -> String {
        format!("ggml-{}.bin", self.id)
    }

    pub fn download_url(&self) -> String {
        format!("{}/{}?download=true", self.source_repo, self.file_name())
    }

    pub fn is_english_only(&self) -> bool {
        self.id.contains(".en")
    }
}

pub const MODEL_OPTIONS: &[ModelOption] = &[
    ModelOption::new("tiny", "Multilingual, fastest"),
    ModelOption::new("tiny.en", "English only, fastest"),
    ModelOption::new("tiny-q5_1", "Multilingual, quantized q5_1"),
    ModelOption::new("tiny.en-q5_1", "English only, quantized q5_1"),
    ModelOption::new("tiny-q8_0", "Multilingual, quantized q8_0"),
    ModelOption::new("tiny.en-q8_0", "English only, quantized q8_0"),
    ModelOption::new("base", "Multilingual, better quality"),
    ModelOption::new("base.en", "English only, better quality"),
    ModelOption::new("base-q5_1", "Multilingual, quantized q5_1"),
    ModelOption::new("base.en-q5_1", "English only, quantized q5_1"),
    ModelOption::new("base-q8_0", "Multilingual, quantized q8_0"),
    ModelOption::new("base.en-q8_0", "English only, quantized q8_0"),
    ModelOption::new("small", "Multilingual, higher quality"),
    ModelOption::new("small.en", "English only, higher quality"),
    ModelOption::new("small-q5_1", "Multilingual, quantized q5_1"),
    ModelOption::new("small.en-q5_1", "English only, quantized q5_1"),
    ModelOption::new("small-q8_0", "Multilingual, quantized q8_0"),
    ModelOption::new("small.en-q8_0", "English only, quantized q8_0"),
    ModelOption {
        id: "small.en-tdrz",
        details: "English only with tiny diarization",
        source_repo: TINY_DIARIZE_REPO,
    },
    ModelOption::new("medium", "Multilingual, highest quality in this list"),
    ModelOption::new("medium.en", "English only, highest quality in this list"),
    ModelOption::new("medium-q5_0", "Multilingual, quantized q5_0"),
    ModelOption::new("medium.en-q5_0", "English only, quantized q5_0"),
    ModelOption::new("medium-q8_0", "Multilingual, quantized q8_0"),
    ModelOption::new("medium.en-q8_0", "English only, quantized q8_0"),
];

pub fn find_by_id(id: &str) -> Option<&'static ModelOption> {
    MODEL_OPTIONS.iter().find(|o| o.id == id)
}

pub fn default_option() -> &'static ModelOption {
    // DEFAULT_MODEL_ID is always present in MODEL_OPTIONS.
    find_by_id(DEFAULT_MODEL_ID).unwrap_or(&MODEL_OPTIONS[0])
}

/// Look up `id`, falling back to the default model when it is unknown.
pub fn resolve_or_default(id: &str) -> &'static ModelOption {
    find_by_id(id).unwrap_or_else(|| {
        let fallback = default_option();
        log::warn!("Unknown whisper model '{id}'. Falling back to '{}'.", fallback.id);
        fallback
    })
}
