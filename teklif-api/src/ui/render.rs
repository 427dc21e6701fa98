//! 服务端渲染的 HTML 页面

use std::fmt::Write;

use pricing::{average_prices, HistoryRecord, PriceDirection, Product, KDV_RATES};

use crate::ui::{EditOfferModal, HistoryPanel, OfferDraft, ProductListView, DESKTOP_BREAKPOINT_PX};

/// 渲染整页
pub fn page(view: &ProductListView, modal: &EditOfferModal, history: &HistoryPanel) -> String {
    let mut body = String::new();
    render_nav(&mut body, view);

    body.push_str("<main>");
    render_stats(&mut body, view);
    body.push_str(r#"<div class="grid">"#);
    render_product_list(&mut body, view);
    render_offers(&mut body, view, modal);
    body.push_str("</div>");
    render_history(&mut body, view, history);
    body.push_str("</main>");
    render_modal(&mut body, view, modal);

    format!(
        r#"<!DOCTYPE html>
<html lang="tr">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Teklif Yönetimi</title>
<style>{style}</style>
</head>
<body>{body}</body>
</html>"#,
        style = stylesheet(),
    )
}

fn stylesheet() -> String {
    format!(
        "{style}\n@media (min-width: {bp}px) {{ .grid {{ grid-template-columns: 1fr 2fr; }} .modal {{ display: none; }} }}\n@media (max-width: {max}px) {{ .inline-edit {{ display: none; }} }}",
        style = STYLE,
        bp = DESKTOP_BREAKPOINT_PX,
        max = DESKTOP_BREAKPOINT_PX - 1,
    )
}

const STYLE: &str = "\
body { margin: 0; font-family: system-ui, sans-serif; background: #f9fafb; color: #111827; }
nav { position: sticky; top: 0; background: #fff; box-shadow: 0 1px 2px rgba(0,0,0,.05); padding: 12px 24px; display: flex; flex-wrap: wrap; gap: 12px; justify-content: space-between; align-items: center; }
nav .brand { font-size: 1.25rem; font-weight: 600; }
main { max-width: 80rem; margin: 0 auto; padding: 24px; }
.stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: 16px; margin-bottom: 24px; }
.card { background: #fff; border-radius: 12px; box-shadow: 0 1px 2px rgba(0,0,0,.05); padding: 16px; }
.card .label { font-size: .8rem; color: #4b5563; }
.card .value { font-size: 1.5rem; font-weight: 600; }
.grid { display: grid; grid-template-columns: 1fr; gap: 24px; margin-bottom: 24px; }
.product { display: block; padding: 12px; margin-bottom: 8px; border-radius: 8px; background: #f9fafb; border: 2px solid transparent; color: inherit; text-decoration: none; }
.product.selected { background: #eff6ff; border-color: #bfdbfe; }
.muted { color: #6b7280; font-size: .875rem; }
.green { color: #16a34a; }
.offer { padding: 12px; margin-bottom: 12px; border-radius: 8px; background: #f9fafb; display: flex; justify-content: space-between; gap: 12px; }
.up { color: #ef4444; }
.down { color: #22c55e; }
form.row { display: flex; flex-wrap: wrap; gap: 8px; }
input, select, button { padding: 8px 12px; border-radius: 8px; border: 1px solid #e5e7eb; }
button { background: #2563eb; color: #fff; border: none; cursor: pointer; }
.modal { position: fixed; inset: 0; background: rgba(0,0,0,.5); display: flex; align-items: flex-end; }
.modal .sheet { background: #fff; width: 100%; max-height: 80vh; overflow-y: auto; border-radius: 16px 16px 0 0; padding: 16px; }
.modal label { display: block; margin: 12px 0 4px; font-size: .875rem; }
.modal input, .modal select { width: 100%; box-sizing: border-box; }";

fn render_nav(out: &mut String, view: &ProductListView) {
    let selected = match view.selected_product() {
        Some(product) => format!(r#"<input type="hidden" name="selected" value="{}">"#, product.id),
        None => String::new(),
    };
    let _ = write!(
        out,
        r#"<nav><span class="brand">Teklif Yönetimi</span><form method="get" action="/">{selected}<input type="search" name="q" placeholder="Ürün ara..." value="{q}"></form></nav>"#,
        q = escape(view.search()),
    );
}

fn render_stats(out: &mut String, view: &ProductListView) {
    let stats = view.stats();
    let _ = write!(
        out,
        r#"<div class="stats">{}{}{}</div>"#,
        stat_card("Toplam Ürün", &stats.total_products.to_string()),
        stat_card("Toplam Teklif", &stats.total_offers.to_string()),
        stat_card("Ortalama Teklif/Ürün", &format!("{:.1}", stats.offers_per_product)),
    );
}

fn stat_card(label: &str, value: &str) -> String {
    format!(r#"<div class="card"><div class="label">{label}</div><div class="value">{value}</div></div>"#)
}

fn render_product_list(out: &mut String, view: &ProductListView) {
    let products = view.filtered_products();
    let selected_id = view.selected_product().map(|p| p.id);

    let _ = write!(
        out,
        r#"<section class="card"><h2>Ürünler <span class="muted">{} ürün</span></h2>"#,
        products.len()
    );

    for product in products {
        let class = if selected_id == Some(product.id) { "product selected" } else { "product" };
        let _ = write!(
            out,
            r#"<a class="{class}" href="{href}"><strong>{name}</strong> <span class="muted">{count} teklif</span>"#,
            href = page_link(view.search(), Some(product.id), None),
            name = escape(&product.name),
            count = product.offers.len(),
        );
        if !product.offers.is_empty() {
            let averages = average_prices(&product.offers);
            let _ = write!(
                out,
                r#"<div class="muted">Ort. KDV'siz: {} TL</div><div class="green">Ort. KDV'li: {} TL</div>"#,
                amount(averages.avg_without_kdv),
                amount(averages.avg_with_kdv),
            );
        }
        out.push_str("</a>");
    }

    out.push_str(
        r#"<form class="row" method="post" action="/products"><input type="text" name="name" placeholder="Yeni ürün adı" required><button type="submit">+</button></form></section>"#,
    );
}

fn render_offers(out: &mut String, view: &ProductListView, modal: &EditOfferModal) {
    let Some(product) = view.selected_product() else {
        out.push_str(r#"<section class="card"><p class="muted">Detayları görüntülemek için bir ürün seçin</p></section>"#);
        return;
    };

    let _ = write!(
        out,
        r#"<section class="card"><h2>{name} <span class="muted">{count} teklif</span></h2>"#,
        name = escape(&product.name),
        count = product.offers.len(),
    );

    let editing_index = modal
        .editing()
        .filter(|editing| editing.product_id == product.id)
        .map(|editing| editing.index);

    for (index, offer) in view.sorted_offers() {
        let _ = write!(
            out,
            r#"<div class="offer"><div><strong>{firm}</strong> <a class="muted" href="{edit}">Düzenle</a></div><div><div class="muted">KDV'siz: {price} TL</div><div class="green">KDV'li (%{rate}): {with_kdv} TL</div></div></div>"#,
            firm = escape(&offer.firm),
            edit = page_link(view.search(), Some(product.id), Some(index)),
            price = amount(offer.price),
            rate = offer.kdv_rate,
            with_kdv = amount(offer.effective_price_with_kdv()),
        );

        if editing_index == Some(index) {
            if let Some(editing) = modal.editing() {
                out.push_str(r#"<div class="inline-edit">"#);
                render_offer_form(out, &edit_action(product, index), &editing.draft, "Kaydet");
                out.push_str("</div>");
            }
        }
    }

    render_offer_form(
        out,
        &format!("/products/{}/offers", product.id),
        view.draft(),
        "Teklif Ekle",
    );
    out.push_str("</section>");
}

fn render_offer_form(out: &mut String, action: &str, draft: &OfferDraft, submit: &str) {
    let _ = write!(
        out,
        r#"<form class="row" method="post" action="{action}"><input type="text" name="firm" placeholder="Firma adı" value="{firm}" required><input type="number" step="any" min="0" name="price" placeholder="Fiyat" value="{price}" required>{select}<button type="submit">{submit}</button></form>"#,
        firm = escape(&draft.firm),
        price = escape(&draft.price),
        select = kdv_select(draft.kdv_rate),
    );
}

fn kdv_select(current: f64) -> String {
    let mut select = String::from(r#"<select name="kdvRate">"#);
    for rate in KDV_RATES {
        let selected = if f64::from(rate) == current { " selected" } else { "" };
        let _ = write!(select, r#"<option value="{rate}"{selected}>KDV {rate}%</option>"#);
    }
    select.push_str("</select>");
    select
}

fn edit_action(product: &Product, index: usize) -> String {
    format!("/products/{}/offers/{}", product.id, index)
}

fn render_history(out: &mut String, view: &ProductListView, history: &HistoryPanel) {
    let mut toggle = page_link(view.search(), view.selected_product().map(|p| p.id), None);
    if !history.is_open() {
        toggle.push_str(if toggle.contains('?') { "&amp;history=open" } else { "?history=open" });
    }

    let _ = write!(
        out,
        r#"<section class="card"><a href="{toggle}" style="color:inherit;text-decoration:none"><h2>Fiyat Değişim Geçmişi <span class="muted">({count} değişiklik)</span> {arrow}</h2></a>"#,
        count = history.len(),
        arrow = if history.is_open() { "▲" } else { "▼" },
    );

    if history.is_open() {
        for record in history.records() {
            render_history_record(out, record);
        }
    }
    out.push_str("</section>");
}

fn render_history_record(out: &mut String, record: &HistoryRecord) {
    let (class, arrow) = match record.direction() {
        PriceDirection::Up => ("up", "↑"),
        PriceDirection::Down => ("down", "↓"),
    };
    let _ = write!(
        out,
        r#"<div class="offer"><div><strong>{product}</strong><div class="muted">{firm}</div><div class="muted">{date}</div></div><div><span class="muted">{old} TL</span> <span class="{class}">{arrow}</span> <strong>{new} TL</strong><div class="muted">KDV: %{rate}</div></div></div>"#,
        product = escape(&record.product_name),
        firm = escape(&record.firm),
        date = record.date.format("%d.%m.%Y %H:%M:%S"),
        old = amount(record.old_price),
        new = amount(record.new_price),
        rate = record.kdv_rate,
    );
}

fn render_modal(out: &mut String, view: &ProductListView, modal: &EditOfferModal) {
    let Some(editing) = modal.editing() else {
        return;
    };
    let Some(product) = view.selected_product().filter(|p| p.id == editing.product_id) else {
        return;
    };

    let close = page_link(view.search(), Some(product.id), None);
    let _ = write!(
        out,
        r#"<div class="modal"><div class="sheet"><h3>Teklif Düzenle <a href="{close}" class="muted">✕</a></h3><form method="post" action="{action}"><label>Firma</label><input type="text" name="firm" value="{firm}" required><label>Fiyat</label><input type="number" step="any" min="0" name="price" value="{price}" required><label>KDV Oranı</label>{select}<div class="row" style="margin-top:16px"><a href="{close}">İptal</a> <button type="submit">Kaydet</button></div></form></div></div>"#,
        action = edit_action(product, editing.index),
        firm = escape(&editing.draft.firm),
        price = escape(&editing.draft.price),
        select = kdv_select(editing.draft.kdv_rate),
    );
}

/// 页面内链接，保留搜索关键字
fn page_link(search: &str, selected: Option<u64>, edit: Option<usize>) -> String {
    let mut params = Vec::new();
    if !search.is_empty() {
        params.push(format!("q={}", urlencoding::encode(search)));
    }
    if let Some(id) = selected {
        params.push(format!("selected={}", id));
    }
    if let Some(index) = edit {
        params.push(format!("edit={}", index));
    }

    if params.is_empty() {
        "/".to_string()
    } else {
        format!("/?{}", params.join("&amp;"))
    }
}

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
