use crate::config::PlannerConfig;
use crate::plate::SourcePlate;
use crate::well::{WellAddress, row_letter};
use svg::Document;
use svg::node::element::{Circle, Rectangle, Text};

const CELL: f32 = 34.0;
const MARGIN_LEFT: f32 = 70.0;
const MARGIN_TOP: f32 = 86.0;
const MARGIN_RIGHT: f32 = 40.0;
const MARGIN_BOTTOM: f32 = 40.0;

const CATEGORY_FILLS: &[&str] = &[
    "#60a5fa", "#34d399", "#f59e0b", "#f472b6", "#a78bfa", "#f87171",
];
const UNKNOWN_FILL: &str = "#9ca3af";

fn category_fill(config: &PlannerConfig, category: char) -> &'static str {
    config
        .categories
        .iter()
        .position(|&c| c == category)
        .map(|idx| CATEGORY_FILLS[idx % CATEGORY_FILLS.len()])
        .unwrap_or(UNKNOWN_FILL)
}

/// Render a source plate as an SVG plate map: one circle per well, filled
/// wells colored by reagent category and labeled with their code. Meant as
/// a quick visual check of the layout before filling the plate by hand.
pub fn export_layout_svg(plate: &SourcePlate, config: &PlannerConfig) -> String {
    let columns = config.columns as f32;
    let rows = config.rows as f32;
    let width = MARGIN_LEFT + columns * CELL + MARGIN_RIGHT;
    let height = MARGIN_TOP + rows * CELL + MARGIN_BOTTOM;

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", "#f9fafb"),
        )
        .add(
            Rectangle::new()
                .set("x", MARGIN_LEFT - 14.0)
                .set("y", MARGIN_TOP - 14.0)
                .set("width", columns * CELL + 28.0)
                .set("height", rows * CELL + 28.0)
                .set("rx", 10)
                .set("ry", 10)
                .set("fill", "#ffffff")
                .set("stroke", "#111315")
                .set("stroke-width", 2),
        )
        .add(
            Text::new(format!(
                "Source plate {} ({}) | {} filled well(s)",
                plate.number,
                plate.label,
                plate.wells.len()
            ))
            .set("x", MARGIN_LEFT - 14.0)
            .set("y", 40.0)
            .set("font-family", "monospace")
            .set("font-size", 16)
            .set("fill", "#0f172a"),
        );

    for column in 1..=config.columns {
        let x = MARGIN_LEFT + (column as f32 - 0.5) * CELL;
        doc = doc.add(
            Text::new(column.to_string())
                .set("x", x)
                .set("y", MARGIN_TOP - 22.0)
                .set("text-anchor", "middle")
                .set("font-family", "monospace")
                .set("font-size", 11)
                .set("fill", "#334155"),
        );
    }
    for row in 0..config.rows {
        let y = MARGIN_TOP + (row as f32 + 0.5) * CELL;
        doc = doc.add(
            Text::new(row_letter(row).to_string())
                .set("x", MARGIN_LEFT - 26.0)
                .set("y", y + 4.0)
                .set("text-anchor", "middle")
                .set("font-family", "monospace")
                .set("font-size", 11)
                .set("fill", "#334155"),
        );
    }

    for row in 0..config.rows {
        for column in 1..=config.columns {
            let well = WellAddress::new(row, column);
            let cx = MARGIN_LEFT + (column as f32 - 0.5) * CELL;
            let cy = MARGIN_TOP + (row as f32 + 0.5) * CELL;
            match plate.wells.get(&well) {
                Some(code) => {
                    doc = doc
                        .add(
                            Circle::new()
                                .set("cx", cx)
                                .set("cy", cy)
                                .set("r", CELL * 0.42)
                                .set("fill", category_fill(config, code.category()))
                                .set("stroke", "#1f2937")
                                .set("stroke-width", 1),
                        )
                        .add(
                            Text::new(code.as_str().to_string())
                                .set("x", cx)
                                .set("y", cy + 3.0)
                                .set("text-anchor", "middle")
                                .set("font-family", "monospace")
                                .set("font-size", 9)
                                .set("fill", "#111827"),
                        );
                }
                None => {
                    doc = doc.add(
                        Circle::new()
                            .set("cx", cx)
                            .set("cy", cy)
                            .set("r", CELL * 0.42)
                            .set("fill", "none")
                            .set("stroke", "#d1d5db")
                            .set("stroke-width", 1),
                    );
                }
            }
        }
    }

    doc.to_string()
}
