//! Message normalization: MIME tree walk and header resolution

use crate::address::{self, CcRecipient, FromAddress};
use crate::charset;
use crate::encoded_word::{decode_first_segment, decode_header};
use crate::error::{NormalizeError, Result};
use crate::extracted::TextPart;
use crate::mime::MimePart;
use crate::options::NormalizerOptions;
use crate::types::{Attachment, MessageIdentity, NormalizedMessage};
use tracing::{debug, warn};

/// Parse raw message bytes and normalize them with default options
pub fn parse_message(identity: MessageIdentity, raw: &[u8]) -> Result<NormalizedMessage> {
    parse_message_with(identity, raw, &NormalizerOptions::default())
}

/// Parse raw message bytes and normalize them
pub fn parse_message_with(
    identity: MessageIdentity,
    raw: &[u8],
    options: &NormalizerOptions,
) -> Result<NormalizedMessage> {
    let parsed =
        mailparse::parse_mail(raw).map_err(|e| NormalizeError::Structure(e.to_string()))?;
    normalize(&parsed, identity, options)
}

/// Normalize an already-parsed MIME tree.
///
/// Body decoding never fails: unknown charsets fall back, invalid bytes are
/// replaced, broken text bodies are decoded leniently and undecodable
/// attachments are kept without data. The only
/// error is a Cc header that cannot be split into recipients.
pub fn normalize<P: MimePart>(
    root: &P,
    identity: MessageIdentity,
    options: &NormalizerOptions,
) -> Result<NormalizedMessage> {
    let mut message = NormalizedMessage::new(identity);

    if root.is_multipart() {
        walk(root, options, &mut message);
    } else {
        // A flat message is read as plain text whatever it declares.
        add_text(root, options, &mut message);
    }

    resolve_headers(root, options, &mut message)?;

    debug!(
        uid = message.uid,
        text = message.text.len(),
        html = message.html.len(),
        attachments = message.attachments.len(),
        "Normalized message: {}",
        message.subject
    );

    Ok(message)
}

fn walk<P: MimePart>(part: &P, options: &NormalizerOptions, message: &mut NormalizedMessage) {
    for child in part.subparts() {
        if child.is_multipart() {
            walk(child, options, message);
            continue;
        }
        // Header-less parts are separators, not content
        if !child.has_headers() {
            continue;
        }

        let content_type = child.content_type();
        match content_type.as_str() {
            "text/plain" => add_text(child, options, message),
            "text/html" => add_html(child, options, message),
            _ => add_attachment(child, content_type, options, message),
        }
    }
}

fn add_text<P: MimePart>(part: &P, options: &NormalizerOptions, message: &mut NormalizedMessage) {
    let bytes = body_payload(part, message);
    let decoded = charset::decode(
        &bytes,
        part.declared_charset().as_deref(),
        &options.fallback_charset,
    );
    message.lossy |= decoded.lossy;
    message.text.push(TextPart::new(decoded.text));
}

fn add_html<P: MimePart>(part: &P, options: &NormalizerOptions, message: &mut NormalizedMessage) {
    let bytes = body_payload(part, message);
    let declared = match part.declared_charset() {
        Some(declared) => Some(declared),
        None if options.detect_html_charset => charset::declared_html_charset(&bytes),
        None => None,
    };
    let decoded = charset::decode(&bytes, declared.as_deref(), &options.fallback_charset);
    message.lossy |= decoded.lossy;
    message.html.push(decoded.text);
}

fn add_attachment<P: MimePart>(
    part: &P,
    content_type: String,
    options: &NormalizerOptions,
    message: &mut NormalizedMessage,
) {
    let data = match part.payload() {
        Ok(data) => Some(data),
        Err(e) => {
            warn!(
                uid = message.uid,
                content_type = %content_type,
                "Keeping attachment without data: {e}"
            );
            None
        }
    };

    let filename = part
        .filename()
        .map(|raw| decode_header(&raw, &options.fallback_charset))
        .unwrap_or_default();
    message.lossy |= filename.lossy;

    message.attachments.push(Attachment {
        filename: filename.text,
        data,
        content_type,
    });
}

// Text is never dropped for a broken transfer encoding; whatever survives
// lenient decoding is kept and the message is marked lossy.
fn body_payload<P: MimePart>(part: &P, message: &mut NormalizedMessage) -> Vec<u8> {
    match part.payload() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(uid = message.uid, "Decoding body payload leniently: {e}");
            message.lossy = true;
            part.payload_lenient()
        }
    }
}

fn resolve_headers<P: MimePart>(
    root: &P,
    options: &NormalizerOptions,
    message: &mut NormalizedMessage,
) -> Result<()> {
    let fallback = options.fallback_charset.as_str();

    if let Some(subject) = root.header("Subject") {
        let decoded = decode_header(&subject, fallback);
        message.lossy |= decoded.lossy;
        message.subject = decoded.text;
    }

    // From may be folded across physical lines
    let from_raw = root.header("From").unwrap_or_default();
    let from = decode_header(&address::collapse_folding(&from_raw), fallback);
    message.lossy |= from.lossy;
    let sender = FromAddress::parse(&from.text);
    message.from = sender.raw;
    message.from_whom = sender.name;
    message.from_email = sender.email;

    if let Some(to) = root.header("To") {
        let decoded = decode_first_segment(&to, fallback);
        message.lossy |= decoded.lossy;
        message.to = address::parse_to(&decoded.text);
    }

    let cc_raw = root.header("Cc").unwrap_or_default();
    let cc = decode_header(&cc_raw, fallback);
    message.lossy |= cc.lossy;
    message.cc = CcRecipient::parse_list(&cc.text)?;

    message.date = root.header("Date");
    message.headers = root.header_pairs().into_iter().collect();

    Ok(())
}
