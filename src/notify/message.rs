//! 告警文本渲染，供 log / command 通道使用

use crate::notify::Alert;

pub fn subject(alert: &Alert) -> String {
    format!("Backup alert - {} [{}]", alert.client_id, alert.status)
}

pub fn render_text(alert: &Alert) -> String {
    format!(
        "BACKUP ALERT\n\
         \n\
         Client : {}\n\
         Status : {}\n\
         Reason : {}\n\
         Time   : {}\n\
         \n\
         Please check this client's backup as soon as possible.",
        alert.client_id,
        alert.status,
        alert.reason,
        alert.raised_at.format("%Y-%m-%d %H:%M:%S %z"),
    )
}
