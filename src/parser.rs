use std::collections::HashMap;

use url::Url;

use crate::error::CheckError;

/// Parsed form of a VLESS connection string.
///
/// Format: `vless://uuid@host:port?params#name`
#[derive(Debug, Clone)]
pub struct ConnectionTarget {
    pub uuid: String,
    pub host: String,
    pub port: u16,
    /// Human-readable node name taken from the URI fragment.
    pub name: String,
    /// Query parameters as encoded. Unrecognized keys are kept but unused.
    pub params: HashMap<String, String>,
}

impl ConnectionTarget {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parses a `vless://` URI into a [`ConnectionTarget`].
///
/// The uuid, host and port are all required; any set of query parameters is
/// accepted. A missing fragment falls back to `host:port` as the node name.
pub fn parse_vless_uri(uri: &str) -> Result<ConnectionTarget, CheckError> {
    let url = Url::parse(uri)
        .map_err(|e| CheckError::InvalidConfigFormat(format!("not a valid URI: {e}")))?;

    if url.scheme() != "vless" {
        return Err(CheckError::InvalidConfigFormat(format!(
            "unexpected scheme '{}'",
            url.scheme()
        )));
    }

    let uuid = url.username().to_string();
    if uuid.is_empty() {
        return Err(CheckError::InvalidConfigFormat("missing user id".into()));
    }

    let host = url
        .host_str()
        .ok_or_else(|| CheckError::InvalidConfigFormat("missing host".into()))?
        .to_string();

    let port = url
        .port()
        .ok_or_else(|| CheckError::InvalidConfigFormat("missing port".into()))?;

    let params: HashMap<String, String> = url.query_pairs().into_owned().collect();

    let name = url
        .fragment()
        .map(|f| {
            urlencoding::decode(f)
                .unwrap_or_else(|_| f.into())
                .into_owned()
        })
        .unwrap_or_else(|| format!("{host}:{port}"));

    Ok(ConnectionTarget {
        uuid,
        host,
        port,
        name,
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_uri() {
        let target =
            parse_vless_uri("vless://abc-123@example.com:443?security=tls#my-node").unwrap();
        assert_eq!(target.uuid, "abc-123");
        assert_eq!(target.host, "example.com");
        assert_eq!(target.port, 443);
        assert_eq!(target.name, "my-node");
        assert_eq!(target.params.get("security"), Some(&"tls".to_string()));
    }

    #[test]
    fn round_trips_encoded_fields() {
        let uuid = "d9c5a1f2-70e5-4cbe-9a42-0b3fb3f0d9aa";
        let uri = format!("vless://{uuid}@proxy.example.net:8443?type=ws&path=/ws");
        let target = parse_vless_uri(&uri).unwrap();
        assert_eq!(target.uuid, uuid);
        assert_eq!(target.host, "proxy.example.net");
        assert_eq!(target.port, 8443);
        assert_eq!(target.endpoint(), "proxy.example.net:8443");
    }

    #[test]
    fn unrecognized_params_are_retained() {
        let target =
            parse_vless_uri("vless://abc@example.com:443?security=tls&future-knob=1&x=y").unwrap();
        assert_eq!(target.params.get("future-knob"), Some(&"1".to_string()));
        assert_eq!(target.params.get("x"), Some(&"y".to_string()));
    }

    #[test]
    fn name_defaults_to_endpoint() {
        let target = parse_vless_uri("vless://abc@example.com:443").unwrap();
        assert_eq!(target.name, "example.com:443");
    }

    #[test]
    fn name_is_percent_decoded() {
        let target = parse_vless_uri("vless://abc@example.com:443#US%20Server").unwrap();
        assert_eq!(target.name, "US Server");
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        let err = parse_vless_uri("vmess://abc@example.com:443").unwrap_err();
        assert!(matches!(err, CheckError::InvalidConfigFormat(_)));
    }

    #[test]
    fn missing_uuid_is_rejected() {
        assert!(parse_vless_uri("vless://@example.com:443").is_err());
        assert!(parse_vless_uri("vless://example.com:443").is_err());
    }

    #[test]
    fn missing_port_is_rejected() {
        assert!(parse_vless_uri("vless://abc@example.com").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_vless_uri("not-a-uri").is_err());
        assert!(parse_vless_uri("vless://").is_err());
        assert!(parse_vless_uri("").is_err());
    }

    #[test]
    fn ipv6_host() {
        let target = parse_vless_uri("vless://abc@[::1]:443").unwrap();
        assert_eq!(target.host, "[::1]");
        assert_eq!(target.port, 443);
    }
}
