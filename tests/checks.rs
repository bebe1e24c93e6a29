//! End-to-end checker behaviour through the module registry.

use dirac::checks::{HttpReply, ModuleRegistry, Params, ProtocolTag, Response};
use dirac::{CheckError, Checker};

fn build(module: &str, params: Params) -> Box<dyn Checker> {
    ModuleRegistry::builtin()
        .get(module)
        .unwrap_or_else(|| panic!("module {module} missing"))
        .build(&params)
        .unwrap()
}

#[test]
fn test_ftp_banner() {
    let checker = build("ftp", Params::new().with("port", 21).with("response_code", 220));
    assert_eq!(checker.protocol(), ProtocolTag::TextTcp);
    assert!(checker.check_response(&Response::Text("220 FTP Server")).unwrap());
}

#[test]
fn test_smtp_postfix() {
    let checker = build(
        "smtp",
        Params::new()
            .with("port", 25)
            .with("software", ".*Postfix.*")
            .with("proxy", "false")
            .with("return_code", 220),
    );
    let reply = "220-smtp.server.local ESMTP Postfix (Ubuntu)";
    assert!(checker.check_response(&Response::Text(reply)).unwrap());
}

#[test]
fn test_ssh_identification() {
    let checker = build(
        "ssh",
        Params::new()
            .with("port", 22)
            .with("version", "2.0")
            .with("software", "OpenSSH.*"),
    );
    let reply = "SSH-2.0-OpenSSH_6.6.1p1 Ubuntu-2ubuntu2";
    assert!(checker.check_response(&Response::Text(reply)).unwrap());

    let err = checker
        .check_response(&Response::Text("FOO-2.0-OpenSSH_6.6.1p1"))
        .unwrap_err();
    assert!(matches!(err, CheckError::ResponseCheck(_)));
}

#[test]
fn test_http_status() {
    let checker = build(
        "http",
        Params::new()
            .with("port", 80)
            .with("verb", "GET")
            .with("uri", "http://server.local/index.html")
            .with("response_code", 200),
    );
    assert_eq!(checker.protocol(), ProtocolTag::HttpTcp);

    let ok = HttpReply { status: 200, ..HttpReply::default() };
    assert!(checker.check_response(&Response::Http(&ok)).unwrap());

    let missing = HttpReply { status: 404, ..HttpReply::default() };
    assert!(matches!(
        checker.check_response(&Response::Http(&missing)),
        Err(CheckError::ResponseCheck(_))
    ));
}

#[test]
fn test_mysql_err_packet() {
    let checker = build("mysql", Params::new().with("port", 3306));
    let packet = [
        0x09, 0x00, 0x00, 0x00, 0xFF, 0x01, 0x00, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB, 0xBB,
    ];
    assert!(checker.check_response(&Response::Bytes(&packet)).unwrap());

    let truncated = [0x08, 0x00, 0x00, 0x00, 0xFF, 0x01, 0x00, 0xAA, 0xBB, 0xBB, 0xBB, 0xBB];
    assert!(!checker.check_response(&Response::Bytes(&truncated)).unwrap());
}

#[test]
fn test_mysql_handshake_packet() {
    let checker = build("mysql", Params::new().with("port", 3306));
    let packet = [
        0x14, 0x00, 0x00, 0x00, 0x0A, 0x41, 0x42, 0x43, 0x44, 0x45, 0x00, 0x01, 0x00, 0x00,
        0x00, 0x46, 0x47, 0x48, 0x49, 0x4A, 0x4B, 0x4C, 0x4E, 0x00,
    ];
    assert!(checker.check_response(&Response::Bytes(&packet)).unwrap());
}

#[test]
fn test_invalid_arguments_name_the_parameter() {
    let registry = ModuleRegistry::builtin();
    let err = registry
        .get("ftp")
        .unwrap()
        .validate(&Params::new().with("port", 21).with("response_code", 0))
        .unwrap_err();
    assert_eq!(err.argument(), Some("response_code"));

    let err = registry
        .get("ssh")
        .unwrap()
        .validate(&Params::new().with("port", 22).with("version", "2.0").with("software", "(["))
        .unwrap_err();
    assert_eq!(err.argument(), Some("software"));
}

#[test]
fn test_https_status() {
    let checker = build(
        "https",
        Params::new()
            .with("port", 443)
            .with("verb", "GET")
            .with("uri", "https://server.local/index.html")
            .with("response_code", 200),
    );
    assert_eq!(checker.protocol(), ProtocolTag::HttpsTcp);
    let ok = HttpReply { status: 200, ..HttpReply::default() };
    assert!(checker.check_response(&Response::Http(&ok)).unwrap());
}
