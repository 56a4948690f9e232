/// Counts every request that reaches the wrapped service

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::Arc;

use crate::metrics::HitCounter;

pub struct HitCounterMiddleware {
    counter: Arc<HitCounter>,
}

impl HitCounterMiddleware {
    pub fn new(counter: Arc<HitCounter>) -> Self {
        Self { counter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounterMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterService {
            service: Rc::new(service),
            counter: self.counter.clone(),
        }))
    }
}

pub struct HitCounterService<S> {
    service: Rc<S>,
    counter: Arc<HitCounter>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        self.counter.record();

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
