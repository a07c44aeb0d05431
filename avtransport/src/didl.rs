//! DIDL-Lite item metadata for `CurrentURIMetaData` / `NextURIMetaData`.
//!
//! The item is built as an element tree and serialised by the XML writer, so
//! catalog strings are escaped wherever they land. The serialised document
//! is then carried as the text of the wrapper element, which escapes it a
//! second time on the wire, as AVTransport expects.

use soap_client::{text_element, to_xml_string};
use xmltree::{Element, XMLNode};

use crate::error::Result;
use crate::time::format_duration;
use crate::track::{MediaOrigin, PlayableTrack};

const DIDL_NAMESPACES: [(&str, &str); 6] = [
    ("xmlns", "urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/"),
    ("xmlns:upnp", "urn:schemas-upnp-org:metadata-1-0/upnp/"),
    ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
    ("xmlns:dlna", "urn:schemas-dlna-org:metadata-1-0/"),
    ("xmlns:sec", "http://www.sec.co.kr/"),
    ("xmlns:pv", "http://www.pv.com/pvns/"),
];

/// Lossless FLAC, CD format. Flags: streaming transfer, background transfer, DLNA 1.5.
const FLAC_PROTOCOL_INFO: &str =
    "http-get:*:audio/x-flac:DLNA.ORG_OP=01;DLNA.ORG_FLAGS=01700000000000000000000000000000";

const MUSIC_TRACK_CLASS: &str = "object.item.audioItem.musicTrack";

fn with_attributes(mut element: Element, attributes: &[(&str, &str)]) -> Element {
    for (name, value) in attributes {
        element.attributes.insert(name.to_string(), value.to_string());
    }
    element
}

/// The `<DIDL-Lite>` document describing `track` as served from `origin`.
pub fn didl_element(track: &PlayableTrack, origin: &MediaOrigin) -> Element {
    let parent_id = format!("tidal/albums/{}", track.album_id);
    let item_id = format!("{}/{}", parent_id, track.id);

    let duration = format_duration(track.duration_seconds);
    let mut res = with_attributes(
        Element::new("res"),
        &[
            ("protocolInfo", FLAC_PROTOCOL_INFO),
            ("bitsPerSample", "16"),
            ("sampleFrequency", "44100"),
            ("nrAudioChannels", "2"),
            ("duration", duration.as_str()),
        ],
    );
    res.children.push(XMLNode::Text(origin.track_url(track)));

    let mut item = with_attributes(
        Element::new("item"),
        &[("id", item_id.as_str()), ("parentID", parent_id.as_str()), ("restricted", "1")],
    );
    item.children.extend(
        [
            text_element("upnp:class", MUSIC_TRACK_CLASS),
            text_element("dc:title", track.title.as_str()),
            text_element("dc:creator", track.artist.as_str()),
            text_element("upnp:artist", track.artist.as_str()),
            text_element("upnp:albumArtURI", track.cover_url.as_str()),
            text_element("upnp:album", track.album_title.as_str()),
            text_element("upnp:originalTrackNumber", track.index_in_album.to_string()),
            res,
        ]
        .into_iter()
        .map(XMLNode::Element),
    );

    let mut didl = with_attributes(Element::new("DIDL-Lite"), &DIDL_NAMESPACES);
    didl.children.push(XMLNode::Element(item));
    didl
}

/// `<{element_name}>` whose text is the serialised DIDL-Lite document.
pub fn metadata_element(
    element_name: &str,
    track: &PlayableTrack,
    origin: &MediaOrigin,
) -> Result<Element> {
    let didl = to_xml_string(&didl_element(track, origin))?;
    Ok(text_element(element_name, didl))
}

/// Serialised metadata element, e.g. `<CurrentURIMetaData>&lt;DIDL-Lite …</CurrentURIMetaData>`.
///
/// Only the in-memory XML writer can fail here.
pub fn encode_metadata(
    element_name: &str,
    track: &PlayableTrack,
    origin: &MediaOrigin,
) -> Result<String> {
    Ok(to_xml_string(&metadata_element(element_name, track, origin)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn origin() -> MediaOrigin {
        MediaOrigin::new(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20)), 8000)
    }

    fn track() -> PlayableTrack {
        PlayableTrack {
            id: "1001".to_string(),
            index_in_album: 1,
            title: "Blue in Green".to_string(),
            artist: "Miles Davis".to_string(),
            album_title: "Kind of Blue".to_string(),
            album_id: "42".to_string(),
            cover_url: "https://img.example.com/42/640x640.jpg?size=640&fmt=jpg".to_string(),
            duration_seconds: 337,
            stream_url: "https://cdn.example.com/1001.flac".to_string(),
        }
    }

    /// Unwrap the outer element and parse the DIDL-Lite it carries.
    fn decode(xml: &str, element_name: &str) -> Element {
        let outer = Element::parse(xml.as_bytes()).expect("outer element parses");
        assert_eq!(outer.name, element_name);
        let inner = outer.get_text().expect("metadata text");
        Element::parse(inner.as_bytes()).expect("DIDL-Lite parses")
    }

    fn text_of(item: &Element, name: &str) -> String {
        item.get_child(name)
            .and_then(|e| e.get_text())
            .map(|t| t.into_owned())
            .unwrap_or_else(|| panic!("missing {}", name))
    }

    #[test]
    fn test_metadata_fields() {
        let xml = encode_metadata("CurrentURIMetaData", &track(), &origin()).unwrap();
        let didl = decode(&xml, "CurrentURIMetaData");

        assert_eq!(didl.name, "DIDL-Lite");
        let item = didl.get_child("item").expect("item");
        assert_eq!(item.attributes.get("id").map(String::as_str), Some("tidal/albums/42/1001"));
        assert_eq!(item.attributes.get("parentID").map(String::as_str), Some("tidal/albums/42"));
        assert_eq!(item.attributes.get("restricted").map(String::as_str), Some("1"));

        assert_eq!(text_of(item, "class"), "object.item.audioItem.musicTrack");
        assert_eq!(text_of(item, "title"), "Blue in Green");
        assert_eq!(text_of(item, "creator"), "Miles Davis");
        assert_eq!(text_of(item, "artist"), "Miles Davis");
        assert_eq!(text_of(item, "album"), "Kind of Blue");
        assert_eq!(text_of(item, "originalTrackNumber"), "1");
        assert_eq!(
            text_of(item, "albumArtURI"),
            "https://img.example.com/42/640x640.jpg?size=640&fmt=jpg"
        );

        let res = item.get_child("res").expect("res");
        assert_eq!(text_of(item, "res"), "http://192.168.1.20:8000/42/1001.flac");
        assert_eq!(res.attributes.get("duration").map(String::as_str), Some("0:05:37.000"));
        assert_eq!(res.attributes.get("sampleFrequency").map(String::as_str), Some("44100"));
        assert_eq!(res.attributes.get("bitsPerSample").map(String::as_str), Some("16"));
        assert_eq!(res.attributes.get("nrAudioChannels").map(String::as_str), Some("2"));
        assert!(res.attributes["protocolInfo"].starts_with("http-get:*:audio/x-flac:"));
    }

    #[test]
    fn test_metadata_is_escaped_on_the_wire() {
        let xml = encode_metadata("NextURIMetaData", &track(), &origin()).unwrap();
        assert!(xml.starts_with("<NextURIMetaData>&lt;DIDL-Lite"));
        assert!(!xml.contains("<item"));
    }

    #[test]
    fn test_hostile_fields_stay_well_formed() {
        let mut nasty = track();
        nasty.title = "</dc:title><script>\"x\" & 'y'".to_string();
        nasty.artist = "AC/DC & <Friends>".to_string();
        nasty.album_title = "]]> <![CDATA[".to_string();

        let xml = encode_metadata("CurrentURIMetaData", &nasty, &origin()).unwrap();
        let didl = decode(&xml, "CurrentURIMetaData");
        let item = didl.get_child("item").unwrap();

        assert_eq!(text_of(item, "title"), nasty.title);
        assert_eq!(text_of(item, "creator"), nasty.artist);
        assert_eq!(text_of(item, "album"), nasty.album_title);
    }
}
