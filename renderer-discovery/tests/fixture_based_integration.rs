//! Fixture-based integration tests for renderer discovery
//!
//! These tests use captured description documents, served over a mock HTTP
//! server where a fetch is involved, so no renderer is needed.

mod helpers;

use helpers::DeviceFixture;
use mockito::Server;
use renderer_discovery::{describe, describe_location, DiscoveryError};
use rstest::rstest;
use std::time::Duration;

#[rstest]
#[case(
    "gmrender_device.xml",
    "Living Room Pi",
    "/upnp/control/rendertransport1"
)]
#[case(
    "embedded_renderer.xml",
    "192.168.1.41 - Sonos One",
    "/MediaRenderer/AVTransport/Control"
)]
fn test_describe_fixture(
    #[case] fixture_file: &str,
    #[case] expected_name: &str,
    #[case] expected_control: &str,
) {
    let fixture = DeviceFixture::load(fixture_file);
    let renderer = describe("http://192.168.1.40:49152/description.xml", &fixture.xml_content)
        .unwrap_or_else(|e| panic!("{} failed: {}", fixture.name, e));

    assert_eq!(renderer.friendly_name, expected_name);
    assert_eq!(renderer.base_url, "http://192.168.1.40:49152");
    assert_eq!(renderer.control_url, expected_control);
    assert_eq!(
        renderer.control_endpoint(),
        format!("http://192.168.1.40:49152{}", expected_control)
    );
}

#[test]
fn test_mismatched_fixture_is_rejected() {
    let fixture = DeviceFixture::load("mismatched_lists.xml");
    let err = describe("http://192.168.1.50/desc.xml", &fixture.xml_content).unwrap_err();
    assert!(matches!(
        err,
        DiscoveryError::MismatchedServiceList { services: 2, control_urls: 1 }
    ));
}

#[test]
fn test_describe_location_fetches_over_http() {
    let fixture = DeviceFixture::load("gmrender_device.xml");
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/description.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(&fixture.xml_content)
        .create();

    let location = format!("{}/description.xml", server.url());
    let renderer = describe_location(&location, Duration::from_secs(2)).unwrap();

    mock.assert();
    assert_eq!(renderer.base_url, server.url());
    assert_eq!(
        renderer.control_endpoint(),
        format!("{}/upnp/control/rendertransport1", server.url())
    );
}

#[test]
fn test_describe_location_http_error() {
    let mut server = Server::new();
    let _mock = server.mock("GET", "/gone.xml").with_status(404).create();

    let location = format!("{}/gone.xml", server.url());
    assert!(matches!(
        describe_location(&location, Duration::from_secs(2)),
        Err(DiscoveryError::NetworkError(_))
    ));
}
