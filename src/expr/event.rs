use std::sync::Arc;

use crate::error::AccessorError;
use crate::metadata::{EventRef, MethodRef};

use super::types::{Expr, ExprRef};

/// Operands of an event subscribe (`+=`) or unsubscribe (`-=`) node.
///
/// Construction checks that the event is declared on the instance's exact
/// type and that the handler is delegate-typed.
#[derive(Clone, Debug, PartialEq)]
pub struct EventAccessorCall {
    instance: ExprRef,
    event: Arc<EventRef>,
    handler: ExprRef,
}

impl EventAccessorCall {
    pub fn new(instance: ExprRef, event: Arc<EventRef>, handler: ExprRef) -> Result<Self, AccessorError> {
        let instance_type = instance.ty();
        if event.declaring_type != instance_type.name() {
            return Err(AccessorError::EventNotDeclaredOnInstanceType {
                event: event.name.clone(),
                declaring_type: event.declaring_type.clone(),
                instance_type: instance_type.name(),
            });
        }

        let handler_type = handler.ty();
        if !handler_type.is_delegate() {
            return Err(AccessorError::HandlerNotDelegate {
                handler_type: handler_type.name(),
            });
        }

        Ok(EventAccessorCall {
            instance,
            event,
            handler,
        })
    }

    pub fn instance(&self) -> &ExprRef {
        &self.instance
    }

    pub fn event(&self) -> &Arc<EventRef> {
        &self.event
    }

    pub fn handler(&self) -> &ExprRef {
        &self.handler
    }

    pub(crate) fn reduce_to(&self, accessor: &Arc<MethodRef>) -> ExprRef {
        Expr::call(
            Some(self.instance.clone()),
            accessor.clone(),
            vec![self.handler.clone()],
        )
    }
}

impl Expr {
    /// `instance.Event += handler`
    pub fn subscribe(instance: ExprRef, event: Arc<EventRef>, handler: ExprRef) -> Result<ExprRef, AccessorError> {
        EventAccessorCall::new(instance, event, handler).map(|call| Arc::new(Expr::EventSubscribe(call)))
    }

    /// `instance.Event -= handler`
    pub fn unsubscribe(instance: ExprRef, event: Arc<EventRef>, handler: ExprRef) -> Result<ExprRef, AccessorError> {
        EventAccessorCall::new(instance, event, handler).map(|call| Arc::new(Expr::EventUnsubscribe(call)))
    }
}
