use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{EventHandler, EventProducer, Handler, OrderPlacedEvent, PaymentVerifiedEvent, RefundSettledEvent};

/// Producer handles given to the API layer. Cloneable; publishing to zero subscribers is a no-op.
#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_placed_producer: Vec<EventProducer<OrderPlacedEvent>>,
    pub payment_verified_producer: Vec<EventProducer<PaymentVerifiedEvent>>,
    pub refund_settled_producer: Vec<EventProducer<RefundSettledEvent>>,
}

pub struct EventHandlers {
    pub on_order_placed: Option<EventHandler<OrderPlacedEvent>>,
    pub on_payment_verified: Option<EventHandler<PaymentVerifiedEvent>>,
    pub on_refund_settled: Option<EventHandler<RefundSettledEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_placed = hooks.on_order_placed.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_verified = hooks.on_payment_verified.map(|f| EventHandler::new(buffer_size, f));
        let on_refund_settled = hooks.on_refund_settled.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_placed, on_payment_verified, on_refund_settled }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_placed {
            result.order_placed_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_verified {
            result.payment_verified_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_refund_settled {
            result.refund_settled_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_order_placed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_payment_verified {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
        if let Some(handler) = self.on_refund_settled {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_placed: Option<Handler<OrderPlacedEvent>>,
    pub on_payment_verified: Option<Handler<PaymentVerifiedEvent>>,
    pub on_refund_settled: Option<Handler<RefundSettledEvent>>,
}

impl EventHooks {
    pub fn on_order_placed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderPlacedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_order_placed = Some(Arc::new(f));
        self
    }

    pub fn on_payment_verified<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentVerifiedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_payment_verified = Some(Arc::new(f));
        self
    }

    pub fn on_refund_settled<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(RefundSettledEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_refund_settled = Some(Arc::new(f));
        self
    }
}
