use std::fmt::Write;
use std::path::Path;

use plotters::prelude::*;

use crate::error::PolicyError;

const CANVAS_WIDTH: u32 = 960;
const BOX_WIDTH: i32 = 200;
const BOX_HEIGHT: i32 = 48;
const ROW_GAP: i32 = 34;
const MARGIN: i32 = 20;

/// One layer row in a network summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerSummary {
    pub name: String,
    pub output_dim: usize,
    pub params: usize,
    pub activation: &'static str,
}

/// Structured description of a dual-head actor-critic network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetSummary {
    pub name: &'static str,
    pub input_dim: usize,
    pub trunk: Vec<LayerSummary>,
    pub policy_branch: Vec<LayerSummary>,
    pub policy_heads: Vec<LayerSummary>,
    pub value_branch: Vec<LayerSummary>,
    pub value_head: LayerSummary,
}

impl NetSummary {
    /// All layers in forward order (trunk, policy side, value side).
    pub fn layers(&self) -> impl Iterator<Item = &LayerSummary> {
        self.trunk
            .iter()
            .chain(&self.policy_branch)
            .chain(&self.policy_heads)
            .chain(&self.value_branch)
            .chain(std::iter::once(&self.value_head))
    }

    pub fn total_params(&self) -> usize {
        self.layers().map(|layer| layer.params).sum()
    }
}

/// Renders the summary as an aligned text table.
pub fn render_summary(summary: &NetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", summary.name);
    let _ = writeln!(
        out,
        "{:<16} {:>8} {:>10}  {}",
        "Layer", "Output", "Params", "Activation"
    );
    let _ = writeln!(out, "{:<16} {:>8} {:>10}  {}", "input", summary.input_dim, 0, "-");
    for layer in summary.layers() {
        let _ = writeln!(
            out,
            "{:<16} {:>8} {:>10}  {}",
            layer.name, layer.output_dim, layer.params, layer.activation
        );
    }
    let _ = writeln!(out, "Total params: {}", summary.total_params());
    out
}

/// Draws the network as a block diagram and writes it as a PNG image.
pub fn render_architecture(summary: &NetSummary, out: &Path) -> Result<(), PolicyError> {
    let branch_rows = 1 + summary.policy_branch.len().max(summary.value_branch.len());
    let rows = 1 + summary.trunk.len() + branch_rows;
    let height = (2 * MARGIN + rows as i32 * (BOX_HEIGHT + ROW_GAP)) as u32;

    let root = BitMapBackend::new(out, (CANVAS_WIDTH, height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mid = CANVAS_WIDTH as i32 / 2;
    let policy_mid = mid / 2;
    let value_mid = mid + mid / 2;

    let draw_box = |center: i32, top: i32, label: String, color: &RGBColor| {
        let half = BOX_WIDTH / 2;
        root.draw(&Rectangle::new(
            [(center - half, top), (center + half, top + BOX_HEIGHT)],
            color.mix(0.18).filled(),
        ))
        .map_err(render_error)?;
        root.draw(&Rectangle::new(
            [(center - half, top), (center + half, top + BOX_HEIGHT)],
            color,
        ))
        .map_err(render_error)?;
        root.draw(&Text::new(
            label,
            (center - half + 8, top + BOX_HEIGHT / 2 - 7),
            ("sans-serif", 15).into_font(),
        ))
        .map_err(render_error)?;
        Ok::<(), PolicyError>(())
    };
    let connect = |from: (i32, i32), to: (i32, i32)| {
        root.draw(&PathElement::new(vec![from, to], &BLACK))
            .map_err(render_error)?;
        Ok::<(), PolicyError>(())
    };

    // Input and shared trunk flow down the center.
    let mut y = MARGIN;
    draw_box(mid, y, format!("input ({})", summary.input_dim), &BLACK)?;
    for layer in &summary.trunk {
        connect((mid, y + BOX_HEIGHT), (mid, y + BOX_HEIGHT + ROW_GAP))?;
        y += BOX_HEIGHT + ROW_GAP;
        draw_box(mid, y, layer_label(layer), &BLUE)?;
    }

    // The policy and value branches descend in their own columns.
    let branch_top = y + BOX_HEIGHT + ROW_GAP;
    connect((mid, y + BOX_HEIGHT), (policy_mid, branch_top))?;
    connect((mid, y + BOX_HEIGHT), (value_mid, branch_top))?;

    let mut policy_y = branch_top;
    for (index, layer) in summary.policy_branch.iter().enumerate() {
        if index > 0 {
            connect((policy_mid, policy_y - ROW_GAP), (policy_mid, policy_y))?;
        }
        draw_box(policy_mid, policy_y, layer_label(layer), &GREEN)?;
        policy_y += BOX_HEIGHT + ROW_GAP;
    }
    let head_count = summary.policy_heads.len() as i32;
    for (index, head) in summary.policy_heads.iter().enumerate() {
        let offset = (index as i32 * 2 - (head_count - 1)) * (BOX_WIDTH / 2 + 12);
        connect((policy_mid, policy_y - ROW_GAP), (policy_mid + offset, policy_y))?;
        draw_box(policy_mid + offset, policy_y, layer_label(head), &GREEN)?;
    }

    let mut value_y = branch_top;
    for (index, layer) in summary.value_branch.iter().enumerate() {
        if index > 0 {
            connect((value_mid, value_y - ROW_GAP), (value_mid, value_y))?;
        }
        draw_box(value_mid, value_y, layer_label(layer), &RED)?;
        value_y += BOX_HEIGHT + ROW_GAP;
    }
    connect((value_mid, value_y - ROW_GAP), (value_mid, value_y))?;
    draw_box(value_mid, value_y, layer_label(&summary.value_head), &RED)?;

    root.present().map_err(render_error)?;
    Ok(())
}

fn layer_label(layer: &LayerSummary) -> String {
    format!("{} ({}, {})", layer.name, layer.output_dim, layer.activation)
}

fn render_error<E: std::fmt::Display>(err: E) -> PolicyError {
    PolicyError::Render(format!("{err}"))
}
