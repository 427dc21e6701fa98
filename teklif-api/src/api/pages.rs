//! 浏览器页面：渲染和表单提交
//!
//! 表单提交后统一重定向回首页，失败只记日志，页面保持原状态。

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::server::AppState;
use crate::ui::{render, EditOfferModal, HistoryPanel, OfferDraft, ProductListView};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/products", post(submit_product))
        .route("/products/{id}/offers", post(submit_offer))
        .route("/products/{id}/offers/{index}", post(submit_offer_edit))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub q: Option<String>,
    pub selected: Option<u64>,
    pub edit: Option<usize>,
    pub history: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferForm {
    pub firm: String,
    pub price: String,
    pub kdv_rate: f64,
}

impl From<OfferForm> for OfferDraft {
    fn from(form: OfferForm) -> Self {
        OfferDraft {
            firm: form.firm,
            price: form.price,
            kdv_rate: form.kdv_rate,
        }
    }
}

async fn index(State(state): State<Arc<AppState>>, Query(query): Query<PageQuery>) -> Html<String> {
    let mut view = ProductListView::new(state.products.list().await);
    view.set_search(query.q.unwrap_or_default());
    if let Some(id) = query.selected {
        view.select(id);
    }

    let modal = match (view.selected_product(), query.edit) {
        (Some(product), Some(index)) => EditOfferModal::open(product, index),
        _ => EditOfferModal::Closed,
    };

    let mut history = HistoryPanel::new(state.history.list().await.history);
    if query.history.as_deref() == Some("open") {
        history.toggle();
    }

    Html(render::page(&view, &modal, &history))
}

async fn submit_product(State(state): State<Arc<AppState>>, Form(form): Form<ProductForm>) -> Redirect {
    match state.products.add_product(&form.name).await {
        Ok(saved) => Redirect::to(&format!("/?selected={}", saved.id)),
        Err(err) => {
            warn!(error = %err, "failed to add product");
            Redirect::to("/")
        }
    }
}

async fn submit_offer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Form(form): Form<OfferForm>,
) -> Redirect {
    let back = format!("/?selected={}", id);

    let mut view = ProductListView::new(state.products.list().await);
    view.select(id);
    view.set_draft(form.into());

    let Some(submission) = view.add_offer() else {
        warn!(id, "ignored incomplete offer form");
        return Redirect::to(&back);
    };

    if let Err(err) = state
        .products
        .add_offer(submission.product_id, submission.offer)
        .await
    {
        warn!(error = %err, id, "failed to add offer");
    }

    Redirect::to(&back)
}

async fn submit_offer_edit(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(u64, usize)>,
    Form(form): Form<OfferForm>,
) -> Redirect {
    let back = format!("/?selected={}", id);

    let products = state.products.list().await;
    let Some(product) = products.find(id) else {
        return Redirect::to("/");
    };

    let mut modal = EditOfferModal::open(product, index);
    modal.edit(|draft| *draft = form.into());

    // 表单内容无效时放弃这次编辑
    if modal
        .editing()
        .is_some_and(|editing| editing.draft.to_offer().is_none())
    {
        modal.cancel(|| warn!(id, index, "discarded invalid offer edit"));
        return Redirect::to(&back);
    }

    let Some(offer) = modal.submit(|editing| editing.draft.to_offer()).flatten() else {
        warn!(id, index, "offer to edit not found");
        return Redirect::to(&back);
    };

    if let Err(err) = state.products.update_offer(id, index, offer).await {
        warn!(error = %err, id, index, "failed to update offer");
    }

    Redirect::to(&back)
}
