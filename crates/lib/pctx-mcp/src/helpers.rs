use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};

use crate::tools::context::ContextReply;

/// Wraps a reply as tool output, flagging error replies for the caller.
pub(crate) fn reply_result(reply: &ContextReply) -> Result<CallToolResult, ErrorData> {
    let content = Content::json(reply)?;
    if reply.is_error() {
        Ok(CallToolResult::error(vec![content]))
    } else {
        Ok(CallToolResult::success(vec![content]))
    }
}
