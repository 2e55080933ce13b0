// 服务器模块入口
// 提供监听、连接处理和信号驱动的关闭

pub mod connection;
pub mod listener;
pub mod signal;

// 重新导出常用类型
pub use listener::create_listener;
pub use signal::{start_signal_handler, SignalHandler};

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::AppState;
use crate::logger;

/// Accept connections until a termination signal fires.
///
/// Writes are persisted before their responses go out, so the loop can
/// exit without draining in-flight connections.
pub async fn run(listener: TcpListener, state: Arc<AppState>, signals: Arc<SignalHandler>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::handle_connection(stream, peer_addr, Arc::clone(&state));
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = signals.shutdown.notified() => {
                logger::log_server_stop();
                break;
            }
        }
    }
}
