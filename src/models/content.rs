use serde::{Deserialize, Serialize};

/// Kind of payload carried by a [`ContentPart`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum ContentType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "audio/wav")]
    AudioWav,
    #[serde(rename = "audio/mp3")]
    AudioMp3,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Pdf => "application/pdf",
            ContentType::AudioWav => "audio/wav",
            ContentType::AudioMp3 => "audio/mp3",
        }
    }
}

/// A single unit of multimodal prompt input
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Raw text, or a URL / base64 reference depending on `content_type`
    pub content: String,
}

impl ContentPart {
    pub fn new(content_type: ContentType, content: impl Into<String>) -> Self {
        Self {
            content_type,
            content: content.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(ContentType::Text, content)
    }

    pub fn image(url: impl Into<String>) -> Self {
        Self::new(ContentType::Image, url)
    }

    pub fn pdf(reference: impl Into<String>) -> Self {
        Self::new(ContentType::Pdf, reference)
    }

    pub fn audio_wav(reference: impl Into<String>) -> Self {
        Self::new(ContentType::AudioWav, reference)
    }

    pub fn audio_mp3(reference: impl Into<String>) -> Self {
        Self::new(ContentType::AudioMp3, reference)
    }
}
