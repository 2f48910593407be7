//! Command bridge: routes parsed commands through the TurboNET API.
//!
//! Every API-backed command runs the same pipeline: parse arguments, resolve
//! the acting identity's credential, make one request, check the status,
//! decode the body, format. The per-command differences live in the
//! [`COMMAND_SPECS`] table rather than in separate handlers.

use crate::auth::{AuthHeader, AuthHeaderBuilder};
use crate::client::ApiTransport;
use crate::commands::{parse_command, CommandInvocation, CommandName};
use crate::formatter;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use turbonet_memory::CredentialStore;
use turbonet_types::api::{ApiMethod, ApiRequest};
use turbonet_types::config::BridgeConfig;
use turbonet_types::error::{TurboNetError, TurboNetResult};

/// Whose credential a command runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// No credential (bind establishes one).
    Anonymous,
    /// The user who sent the command.
    Invoker,
    /// The configured administrator.
    Admin,
}

/// Query, body and formatting context for one call.
#[derive(Debug, Clone, Default)]
pub struct PreparedCall {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Name the reply falls back to (player name, arcade code).
    pub subject: String,
}

/// Successful result of a command.
pub enum Outcome {
    /// Reply lines.
    Reply(Vec<String>),
    /// Reply lines plus a credential to store for the invoking user.
    Bound {
        credential: String,
        lines: Vec<String>,
    },
}

/// Static description of one API-backed command.
pub struct CommandSpec {
    pub command: CommandName,
    pub method: ApiMethod,
    pub path: &'static str,
    pub identity: Identity,
    /// Completes "无法…" in the not-bound reply.
    pub action: &'static str,
    /// Prefix of the transport failure reply.
    pub transport_label: &'static str,
    /// Reply when a 200 body is not valid JSON. `None` means the body is ignored.
    pub malformed_reply: Option<&'static str>,
    /// Extra line appended to API error replies.
    pub api_error_hint: Option<&'static str>,
    /// Parse arguments before resolving the credential. Only commands whose
    /// usage text should reach unbound users set this.
    pub args_before_auth: bool,
    pub prepare: fn(&CommandInvocation, &BridgeConfig) -> TurboNetResult<PreparedCall>,
    pub render: fn(&PreparedCall, &Value) -> TurboNetResult<Outcome>,
}

/// All API-backed commands.
pub static COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        command: CommandName::Bind,
        method: ApiMethod::Post,
        path: "/bot/bind",
        identity: Identity::Anonymous,
        action: "绑定",
        transport_label: "请求 /bot/bind",
        malformed_reply: Some("解析 /bot/bind 返回内容失败，请稍后重试。"),
        api_error_hint: Some("请确认 botToken 是否正确。"),
        args_before_auth: true,
        prepare: prepare_bind,
        render: render_bind,
    },
    CommandSpec {
        command: CommandName::Profile,
        method: ApiMethod::Post,
        path: "/web/user",
        identity: Identity::Invoker,
        action: "查询",
        transport_label: "请求 /web/user",
        malformed_reply: Some("解析 /web/user 返回内容失败，请稍后再试。"),
        api_error_hint: None,
        args_before_auth: true,
        prepare: prepare_profile,
        render: render_profile,
    },
    CommandSpec {
        command: CommandName::NetworkStatus,
        method: ApiMethod::Get,
        path: "/web/showNetworkStatus",
        identity: Identity::Invoker,
        action: "查询机厅网络状态",
        transport_label: "请求 /web/showNetworkStatus",
        malformed_reply: Some("解析网络状态返回内容失败。"),
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_empty,
        render: render_network_status,
    },
    CommandSpec {
        command: CommandName::SetTicket,
        method: ApiMethod::Post,
        path: "/web/setTickets",
        identity: Identity::Invoker,
        action: "设置跑图卷",
        transport_label: "设置跑图卷",
        malformed_reply: None,
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_set_ticket,
        render: render_ticket_set,
    },
    CommandSpec {
        command: CommandName::QuickTicket,
        method: ApiMethod::Post,
        path: "/web/setTickets",
        identity: Identity::Invoker,
        action: "设置跑图卷",
        transport_label: "设置跑图卷",
        malformed_reply: None,
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_quick_ticket,
        render: render_ticket_set,
    },
    CommandSpec {
        command: CommandName::ResetTicket,
        method: ApiMethod::Post,
        path: "/web/resetTickets",
        identity: Identity::Invoker,
        action: "取消跑图卷",
        transport_label: "取消跑图卷",
        malformed_reply: None,
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_empty,
        render: render_ticket_reset,
    },
    CommandSpec {
        command: CommandName::CurrentTicket,
        method: ApiMethod::Get,
        path: "/web/currentTickets",
        identity: Identity::Invoker,
        action: "查看跑图卷",
        transport_label: "获取跑图卷信息",
        malformed_reply: Some("解析跑图卷信息返回内容失败。"),
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_empty,
        render: render_current_ticket,
    },
    CommandSpec {
        command: CommandName::ArcadeDetail,
        method: ApiMethod::Get,
        path: "/web/arcadeInfoDetail",
        identity: Identity::Admin,
        action: "查询机厅详情",
        transport_label: "请求 /web/arcadeInfoDetail",
        malformed_reply: Some("解析机厅详情返回内容失败。"),
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_arcade_detail,
        render: render_arcade_detail,
    },
    CommandSpec {
        command: CommandName::AdminNetworkStatus,
        method: ApiMethod::Get,
        path: "/web/showNetworkStatus",
        identity: Identity::Admin,
        action: "查询网络状态",
        transport_label: "请求 /web/showNetworkStatus",
        malformed_reply: Some("解析网络状态返回内容失败。"),
        api_error_hint: None,
        args_before_auth: false,
        prepare: prepare_empty,
        render: render_admin_network_status,
    },
];

/// Look up the spec for an API-backed command.
pub fn spec_for(command: CommandName) -> Option<&'static CommandSpec> {
    COMMAND_SPECS.iter().find(|spec| spec.command == command)
}

pub const HELP_TEXT: &str = "TurboNET maimai 机器人指令：\n\
/bind <botToken>       绑定你的机器人（内部会调 /bot/bind 获取 BotKey）\n\
/mai <TurboNET用户名>  查询 maimai 总览（需要先 /bind）\n\
/mai_status            查询机厅网络状态（需要先 /bind）\n\
/run X                 设置 X 倍跑图卷（需要先 /bind）\n\
/go                    相当于 /run 6（6 倍跑图卷）\n\
/norun                 取消跑图卷（需要先 /bind）\n\
/getrun                查看当前跑图卷倍率（需要先 /bind）\n\
/net                   查看全部机厅网络状态\n\
发送 <机厅代号>j        查询机厅详情";

const BIND_USAGE: &str = "用法：/bind <你的 botToken>\n\
机器人会调用 /bot/bind 获取专属 BotKey 并与当前 QQ 绑定。\n\
注意：你只需要提供 botToken，不需要也拿不到 botKey。";
const PROFILE_USAGE: &str = "用法：/mai <TurboNET用户名>\n例如：/mai AAA_BBB";
const RUN_USAGE: &str = "用法：/run X\n例如：/run 2 或 /run 3";
const RUN_NOT_INTEGER: &str = "跑图卷倍率必须是整数，例如 /run 2。";
const STORAGE_FAILURE: &str = "凭据存储异常，请稍后重试。";

// ---------------------------------------------------------------------------
// prepare
// ---------------------------------------------------------------------------

fn prepare_empty(_: &CommandInvocation, _: &BridgeConfig) -> TurboNetResult<PreparedCall> {
    Ok(PreparedCall::default())
}

fn prepare_bind(inv: &CommandInvocation, config: &BridgeConfig) -> TurboNetResult<PreparedCall> {
    let token = inv
        .first_arg()
        .ok_or_else(|| TurboNetError::Usage(BIND_USAGE.to_string()))?;
    Ok(PreparedCall {
        body: Some(json!({ "botToken": token, "botName": config.bot_name })),
        ..Default::default()
    })
}

fn prepare_profile(inv: &CommandInvocation, _: &BridgeConfig) -> TurboNetResult<PreparedCall> {
    let name = inv
        .first_arg()
        .ok_or_else(|| TurboNetError::Usage(PROFILE_USAGE.to_string()))?;
    Ok(PreparedCall {
        query: vec![("requesterId".to_string(), inv.user_id.clone())],
        body: Some(json!({ "turboName": name })),
        subject: name.to_string(),
    })
}

fn ticket_call(ticket_id: i64) -> PreparedCall {
    PreparedCall {
        body: Some(json!({ "ticketId": ticket_id })),
        ..Default::default()
    }
}

fn prepare_set_ticket(inv: &CommandInvocation, _: &BridgeConfig) -> TurboNetResult<PreparedCall> {
    let arg = inv
        .first_arg()
        .ok_or_else(|| TurboNetError::Usage(RUN_USAGE.to_string()))?;
    let ticket_id = arg
        .parse::<i64>()
        .map_err(|_| TurboNetError::Usage(RUN_NOT_INTEGER.to_string()))?;
    Ok(ticket_call(ticket_id))
}

fn prepare_quick_ticket(_: &CommandInvocation, _: &BridgeConfig) -> TurboNetResult<PreparedCall> {
    Ok(ticket_call(formatter::QUICK_TICKET_ID))
}

fn prepare_arcade_detail(
    inv: &CommandInvocation,
    _: &BridgeConfig,
) -> TurboNetResult<PreparedCall> {
    let code = inv.raw_args.trim();
    Ok(PreparedCall {
        query: vec![("arcadeName".to_string(), code.to_string())],
        subject: code.to_string(),
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

fn render_bind(_: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    let key = body
        .get("botKey")
        .filter(|v| formatter::is_truthy(Some(*v)))
        .map(formatter::display)
        .ok_or_else(|| TurboNetError::MissingField {
            endpoint: "/bot/bind".to_string(),
            field: "botKey".to_string(),
        })?;
    Ok(Outcome::Bound {
        credential: key,
        lines: formatter::format_bind(body),
    })
}

fn render_profile(call: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    Ok(Outcome::Reply(formatter::format_profile(body, &call.subject)))
}

fn status_entries<'a>(path: &str, body: &'a Value) -> TurboNetResult<&'a [Value]> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(&[]),
        _ => Err(TurboNetError::MalformedResponse {
            endpoint: path.to_string(),
            reason: "expected a JSON array".to_string(),
        }),
    }
}

fn render_network_status(_: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    let arcades = status_entries("/web/showNetworkStatus", body)?;
    Ok(Outcome::Reply(formatter::format_network_status(arcades)))
}

fn render_admin_network_status(_: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    let arcades = status_entries("/web/showNetworkStatus", body)?;
    Ok(Outcome::Reply(formatter::format_admin_network_status(
        arcades,
    )))
}

fn render_ticket_set(call: &PreparedCall, _: &Value) -> TurboNetResult<Outcome> {
    let ticket_id = formatter::to_int(call.body.as_ref().and_then(|b| b.get("ticketId")));
    Ok(Outcome::Reply(formatter::format_ticket_set(ticket_id)))
}

fn render_ticket_reset(_: &PreparedCall, _: &Value) -> TurboNetResult<Outcome> {
    Ok(Outcome::Reply(formatter::format_ticket_reset()))
}

fn render_current_ticket(_: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    Ok(Outcome::Reply(formatter::format_current_ticket(body)))
}

fn render_arcade_detail(call: &PreparedCall, body: &Value) -> TurboNetResult<Outcome> {
    Ok(Outcome::Reply(formatter::format_arcade_detail(
        body,
        &call.subject,
    )))
}

// ---------------------------------------------------------------------------
// failure replies
// ---------------------------------------------------------------------------

/// The single user-facing reply for a failed command.
pub fn failure_reply(spec: &CommandSpec, err: &TurboNetError) -> String {
    match err {
        TurboNetError::Usage(usage) => usage.clone(),
        TurboNetError::Unauthenticated(_) => match spec.identity {
            Identity::Admin => format!(
                "管理员尚未绑定 BotKey，无法{}。\n请管理员先使用：/bind <管理员botToken>",
                spec.action
            ),
            _ => format!(
                "你还没有绑定 BotKey，无法{}。\n请先使用：/bind <你的botToken>",
                spec.action
            ),
        },
        TurboNetError::Transport { reason, .. } => {
            format!("{}失败：{reason}", spec.transport_label)
        }
        TurboNetError::Api {
            status, message, ..
        } => {
            let mut reply = format!("{} 返回异常（HTTP {status}）：{message}", spec.path);
            if let Some(hint) = spec.api_error_hint {
                reply.push('\n');
                reply.push_str(hint);
            }
            reply
        }
        TurboNetError::MalformedResponse { .. } => spec
            .malformed_reply
            .unwrap_or("解析返回内容失败。")
            .to_string(),
        TurboNetError::MissingField { field, .. } => format!(
            "绑定失败：未在返回中找到 {field} 字段。\n可能是 botToken 无效或服务器异常，请检查后重试。"
        ),
        TurboNetError::Storage(_) | TurboNetError::Io(_) => STORAGE_FAILURE.to_string(),
        TurboNetError::Config(msg) => format!("配置错误：{msg}"),
    }
}

// ---------------------------------------------------------------------------
// bridge
// ---------------------------------------------------------------------------

/// Routes inbound command text to the API and renders the reply.
///
/// Invocations are independent and may run concurrently; the only mutable
/// shared state is the credential store.
pub struct CommandBridge {
    config: Arc<BridgeConfig>,
    store: Arc<dyn CredentialStore>,
    auth: AuthHeaderBuilder,
    transport: Arc<dyn ApiTransport>,
}

impl CommandBridge {
    /// Create a bridge. `config` is expected to have passed
    /// [`BridgeConfig::validate`].
    pub fn new(
        config: Arc<BridgeConfig>,
        store: Arc<dyn CredentialStore>,
        transport: Arc<dyn ApiTransport>,
    ) -> Self {
        let auth = AuthHeaderBuilder::new(store.clone());
        Self {
            config,
            store,
            auth,
            transport,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Handle one raw inbound message. `None` means the text was not a command.
    pub async fn handle_message(&self, user_id: &str, text: &str) -> Option<String> {
        let invocation = parse_command(user_id, text)?;
        Some(self.execute(&invocation).await)
    }

    /// Run a parsed command to its single reply.
    pub async fn execute(&self, invocation: &CommandInvocation) -> String {
        info!(command = %invocation.command, user = %invocation.user_id, "Dispatching command");

        if invocation.command == CommandName::Help {
            return HELP_TEXT.to_string();
        }
        let Some(spec) = spec_for(invocation.command) else {
            warn!(command = %invocation.command, "No spec registered for command");
            return HELP_TEXT.to_string();
        };

        match self.run(spec, invocation).await {
            Ok(lines) => lines.join("\n"),
            Err(e) => {
                warn!(command = %invocation.command, user = %invocation.user_id, error = %e, "Command failed");
                failure_reply(spec, &e)
            }
        }
    }

    /// Resolve the credential a command runs under.
    fn credential_owner<'a>(
        &'a self,
        spec: &CommandSpec,
        invocation: &'a CommandInvocation,
    ) -> Option<&'a str> {
        match spec.identity {
            Identity::Anonymous => None,
            Identity::Invoker => Some(invocation.user_id.as_str()),
            Identity::Admin => Some(self.config.admin_user_id.as_str()),
        }
    }

    /// Header for the command's identity. `Ok(None)` only for anonymous
    /// commands; an unbound identity is an error.
    fn auth_header(
        &self,
        spec: &CommandSpec,
        invocation: &CommandInvocation,
    ) -> TurboNetResult<Option<AuthHeader>> {
        let Some(owner) = self.credential_owner(spec, invocation) else {
            return Ok(None);
        };
        self.auth
            .build(owner)?
            .map(Some)
            .ok_or_else(|| TurboNetError::Unauthenticated(owner.to_string()))
    }

    async fn run(
        &self,
        spec: &CommandSpec,
        invocation: &CommandInvocation,
    ) -> TurboNetResult<Vec<String>> {
        let (prepared, header) = if spec.args_before_auth {
            let prepared = (spec.prepare)(invocation, &self.config)?;
            (prepared, self.auth_header(spec, invocation)?)
        } else {
            let header = self.auth_header(spec, invocation)?;
            ((spec.prepare)(invocation, &self.config)?, header)
        };

        let mut request = ApiRequest::new(spec.method, spec.path);
        for (key, value) in &prepared.query {
            request = request.with_query(key.as_str(), value.as_str());
        }
        if let Some(ref body) = prepared.body {
            request = request.with_body(body.clone());
        }
        if let Some(header) = header {
            request = request.with_header(header.name(), header.value());
        }

        let response = self.transport.call(request).await?;
        if !response.is_ok() {
            return Err(TurboNetError::Api {
                endpoint: spec.path.to_string(),
                status: response.status,
                message: response.error_message(),
            });
        }

        let body = match spec.malformed_reply {
            Some(_) => response
                .json()
                .map_err(|e| TurboNetError::MalformedResponse {
                    endpoint: spec.path.to_string(),
                    reason: e.to_string(),
                })?,
            None => Value::Null,
        };

        match (spec.render)(&prepared, &body)? {
            Outcome::Reply(lines) => Ok(lines),
            Outcome::Bound { credential, lines } => {
                self.store.set(&invocation.user_id, &credential)?;
                info!(user = %invocation.user_id, "Bound BotKey for user");
                debug!(lines = lines.len(), "Bind confirmation rendered");
                Ok(lines)
            }
        }
    }
}
