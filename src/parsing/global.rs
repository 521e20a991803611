//! The `[global]` pre-pass
//!
//!     `[global mode=inverted, escape=json, bundle=labels]` configures the whole parse that
//!     follows it, wherever it appears in the text. Only the first occurrence counts. It is
//!     removed from the text together with a line break directly after it.
//!
//!     `[!global ...]` is ignored: its settings are discarded and the directive is left in the
//!     text, minus the `!`, to be copied to the output like any other literal text.

use crate::lexing::arguments::parse_settings;
use crate::lexing::patterns::GLOBAL;
use std::borrow::Cow;
use std::ops::Range;
use tracing::warn;

/// Settings of an applied `[global]` directive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalSettings {
    pub inverted: bool,
    pub bundle: Option<String>,
    pub escape: Option<String>,
}

/// Template text after the pre-pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared<'a> {
    pub text: Cow<'a, str>,
    pub settings: GlobalSettings,
    /// Byte range of the original text that was cut out
    removed: Option<Range<usize>>,
}

impl Prepared<'_> {
    /// Map an offset into the prepared text back to the original text
    pub fn original_offset(&self, offset: usize) -> usize {
        match &self.removed {
            Some(range) if offset >= range.start => offset + range.len(),
            _ => offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GlobalError {
    pub message: String,
    /// Offset of the directive in the original text
    pub offset: usize,
}

pub fn prepare(text: &str) -> Result<Prepared<'_>, GlobalError> {
    let Some(caps) = GLOBAL.captures(text) else {
        return Ok(Prepared {
            text: Cow::Borrowed(text),
            settings: GlobalSettings::default(),
            removed: None,
        });
    };
    let Some(whole) = caps.get(0) else {
        return Err(GlobalError {
            message: "malformed [global] directive".into(),
            offset: 0,
        });
    };
    let start = whole.start();

    if caps.name("ignore").is_some() {
        warn!(offset = start, "ignoring [!global] directive");
        let bang = start + 1..start + 2;
        let mut kept = String::with_capacity(text.len() - 1);
        kept.push_str(&text[..bang.start]);
        kept.push_str(&text[bang.end..]);
        return Ok(Prepared {
            text: Cow::Owned(kept),
            settings: GlobalSettings::default(),
            removed: Some(bang),
        });
    }

    let param = caps.name("param").map_or("", |m| m.as_str());
    let fail = |message: String| GlobalError {
        message,
        offset: start,
    };
    let mut settings = GlobalSettings::default();
    for (key, value) in parse_settings(param).map_err(fail)? {
        match key.as_str() {
            "mode" => {
                settings.inverted = match value.to_ascii_lowercase().as_str() {
                    "inverted" => true,
                    "normal" => false,
                    other => return Err(fail(format!("unknown global mode `{other}`"))),
                }
            }
            "bundle" => settings.bundle = Some(value),
            "escape" => settings.escape = Some(value),
            other => return Err(fail(format!("unknown global setting `{other}`"))),
        }
    }

    let mut kept = String::with_capacity(text.len() - whole.len());
    kept.push_str(&text[..start]);
    kept.push_str(&text[whole.end()..]);
    Ok(Prepared {
        text: Cow::Owned(kept),
        settings,
        removed: Some(whole.range()),
    })
}
