use serde_json::{json, Map, Value};

use crate::booster_engine::models::{GeneratedPack, PackSlot, ProbabilityTable};

/// Dollar string for the client, or `null`.
fn price_value(slot: &PackSlot) -> Value {
    match slot.card.price {
        Some(price) => Value::String(format!("{}.{:02}", price.cents() / 100, price.cents() % 100)),
        None        => Value::Null,
    }
}

fn card_entry(slot: &PackSlot) -> Value {
    let card = &slot.card;
    json!({
        "uuid": card.card_id,
        "name": card.name,
        "set_code": card.set_code,
        "collector_number": card.collector_number,
        "rarity": card.rarity,
        "image_uri": card.image_uri.clone().unwrap_or_default(),
        "sheet_name": slot.sheet_name,
        "foil": card.finish.is_foil(),
        "finish": card.finish,
        "treatments": card.treatments,
        "price": price_value(slot),
        "purchase_url": card.purchase_url,
    })
}

/// Response body for an opened pack.
///
/// Cards are listed commons first and mythics last (stable within a rarity),
/// which is how the pack is revealed; the pack itself keeps slot order.
/// `variant_id` and `seed_used` are what a share link needs to replay it.
pub fn pack_response(pack: &GeneratedPack) -> Value {
    let mut slots: Vec<&PackSlot> = pack.slots.iter().collect();
    slots.sort_by_key(|slot| slot.card.rarity.display_rank());

    json!({
        "set_code": pack.product.set_code,
        "product": pack.product.product_type,
        "seed_used": pack.seed,
        "variant_id": pack.variant_index,
        "variant_weight": pack.variant_weight,
        "total_weight": pack.total_weight,
        "cards": slots.into_iter().map(card_entry).collect::<Vec<_>>(),
    })
}

/// Response body for the sheet explorer.
pub fn distribution_response(table: &ProbabilityTable) -> Value {
    let variants: Vec<Value> = table
        .variants
        .iter()
        .map(|v| {
            let contents: Map<String, Value> = v
                .contents
                .iter()
                .map(|slot| (slot.sheet_name.clone(), json!(slot.card_count)))
                .collect();
            json!({
                "variant_id": v.variant_index,
                "weight": v.weight,
                "weight_fraction": v.fraction,
                "contents": contents,
            })
        })
        .collect();

    let sheets: Map<String, Value> = table
        .sheets
        .iter()
        .map(|s| {
            let key = if s.set_code == table.product.set_code {
                s.name.clone()
            } else {
                format!("{}:{}", s.set_code, s.name)
            };
            let cards: Vec<Value> = s
                .cards
                .iter()
                .map(|c| {
                    json!({
                        "uuid": c.card_id,
                        "weight": c.weight,
                        "foil": s.foil,
                        "inclusion": c.inclusion,
                    })
                })
                .collect();
            let entry = json!({
                "set_code": s.set_code,
                "foil": s.foil,
                "card_count": s.card_count,
                "total_weight": s.total_weight,
                "cards": cards,
            });
            (key, entry)
        })
        .collect();

    json!({
        "set_code": table.product.set_code,
        "product": table.product.product_type,
        "total_weight": table.total_weight,
        "variants": variants,
        "sheets": sheets,
        "cards": table
            .cards
            .iter()
            .map(|c| json!({ "card_identifier": c.card_id, "probability": c.probability }))
            .collect::<Vec<_>>(),
    })
}
