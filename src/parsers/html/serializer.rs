use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::translation::error::TranslationResult;

/// 序列化文档
pub fn serialize_document(document: &Handle) -> TranslationResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = document.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::html_to_dom;

    #[test]
    fn test_serialize_round_trip() {
        let dom = html_to_dom(b"<p title=\"Hello\">World</p>", "utf-8").unwrap();
        let html = String::from_utf8(serialize_document(&dom.document).unwrap()).unwrap();
        assert!(html.contains("<p title=\"Hello\">World</p>"));
    }
}
