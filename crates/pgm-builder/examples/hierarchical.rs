//! Example: A hierarchical regression model drawn onto a text canvas
//!
//! This example declares a model with nested plates, builds it, and replays
//! the result onto a `Canvas` implementation that prints every draw call.

use pgm_builder::{Canvas, CanvasSettings, Node, NodeDraw, Pgm, Plate, PlateDraw, identifier::Name};

/// Prints draw calls instead of drawing.
struct TextCanvas {
    lines: Vec<String>,
}

impl Canvas for TextCanvas {
    fn new(settings: &CanvasSettings) -> Self {
        Self {
            lines: vec![format!(
                "canvas {:.2} x {:.2} (grid unit {})",
                settings.shape.width(),
                settings.shape.height(),
                settings.grid_unit
            )],
        }
    }

    fn add_plate(&mut self, plate: &PlateDraw) {
        let rect = plate.rect;
        self.lines.push(format!(
            "plate {:<8} at ({:.2}, {:.2}) size {:.2} x {:.2}",
            plate.label,
            rect.x(),
            rect.y(),
            rect.width(),
            rect.height()
        ));
    }

    fn add_node(&mut self, node: &NodeDraw) {
        let marker = if node.observed { "observed" } else { "latent" };
        self.lines.push(format!(
            "node  {:<8} at ({:.2}, {:.2}) {marker}",
            node.name, node.x, node.y
        ));
    }

    fn add_edge(&mut self, from: Name, to: Name) {
        self.lines.push(format!("edge  {from} -> {to}"));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building hierarchical regression model...\n");

    let pgm = Pgm::new()
        .with_node(Node::hyper_param(r"$\mu_0$").at(0.0, 3.0).of("mu_g").build()?)
        .with_node(Node::hyper_param(r"$\tau^2$").name("tau_sq").right_of("mu_0").of("mu_g").build()?)
        .with_plate(
            Plate::new("$G$")
                .with_node(Node::variable(r"$\mu_g$").below("mu_0").build()?)
                .with_node(Node::variable(r"$\beta_g$").right_of("mu_g").build()?)
                .with_nodes(["y_gi", "x_gi"]),
        )
        .with_plate(
            Plate::new("$N_g$")
                .with_node(Node::data("$x_{g, i}$").below("mu_g").build()?)
                .with_node(
                    Node::data("$y_{g, i}$")
                        .right_of("x_gi")
                        .with_edges_to(["x_gi", "beta_g"])
                        .build()?,
                ),
        )
        .with_node(Node::param(r"$\sigma^2$").right_of("y_gi").build()?);

    let diagram = pgm.build()?;
    let canvas: TextCanvas = diagram.render();

    for line in &canvas.lines {
        println!("{line}");
    }

    Ok(())
}
