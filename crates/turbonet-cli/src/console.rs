//! Console platform adapter: one inbound message per input line.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;
use turbonet_bridge::bridge::CommandBridge;

/// Feed every line of `input` to the bridge as `user_id` and write each reply
/// to `out`. Lines that are not commands produce no output.
///
/// Returns the number of replies written.
pub async fn run_console<R, W>(
    bridge: &CommandBridge,
    user_id: &str,
    input: R,
    out: &mut W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut replies = 0;
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match bridge.handle_message(user_id, &line).await {
            Some(reply) => {
                writeln!(out, "{reply}")?;
                out.flush()?;
                replies += 1;
            }
            None => debug!("Ignoring non-command input"),
        }
    }
    Ok(replies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use turbonet_bridge::client::ApiTransport;
    use turbonet_memory::{CredentialStore, InMemoryCredentialStore};
    use turbonet_types::api::{ApiRequest, ApiResponse};
    use turbonet_types::config::BridgeConfig;
    use turbonet_types::error::TurboNetResult;

    struct OkTransport;

    #[async_trait]
    impl ApiTransport for OkTransport {
        async fn call(&self, _request: ApiRequest) -> TurboNetResult<ApiResponse> {
            Ok(ApiResponse::new(200, ""))
        }
    }

    fn bridge() -> CommandBridge {
        let config = BridgeConfig {
            api_base: "http://turbonet.test".to_string(),
            admin_user_id: "admin".to_string(),
            ..Default::default()
        };
        let store = Arc::new(InMemoryCredentialStore::new());
        store.set("10001", "k1").unwrap();
        CommandBridge::new(Arc::new(config), store, Arc::new(OkTransport))
    }

    #[tokio::test]
    async fn test_console_replies_per_command_line() {
        let bridge = bridge();
        let input: &[u8] = b"/run 2\n\nhello\n/norun\n";
        let mut out = Vec::new();
        let n = run_console(&bridge, "10001", input, &mut out).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "绑定2倍跑图卷成功\n取消跑图卷成功\n"
        );
    }

    #[tokio::test]
    async fn test_console_empty_input() {
        let bridge = bridge();
        let input: &[u8] = b"";
        let mut out = Vec::new();
        assert_eq!(run_console(&bridge, "u", input, &mut out).await.unwrap(), 0);
        assert!(out.is_empty());
    }
}
