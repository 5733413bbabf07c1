//! Canvas + DOM overlay renderer. Reads the scene, never touches game state.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement};

use crate::error::GameError;
use crate::game::{GameEvent, Renderer, Scene};
use crate::notes::{Direction, Note, NoteState};
use crate::session::GameState;
use crate::summary::GameSummary;

const CANVAS_W: u32 = 800;
const CANVAS_H: u32 = 420;
const LANE_TOP: f64 = 320.0;
const LANE_H: f64 = 80.0;
/// Notes outside this window are not drawn.
const DRAW_MIN_X: f64 = -50.0;
const DRAW_MAX_X: f64 = 850.0;

pub const START_BUTTON_ID: &str = "sr-start";

pub struct CanvasRenderer {
    doc: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    hud: Element,
    overlay: Element,
    notice: Element,
    /// Overlay content currently in the DOM, so buttons are not rebuilt every frame.
    overlay_key: Option<String>,
    on_start: Closure<dyn FnMut(web_sys::MouseEvent)>,
}

impl CanvasRenderer {
    pub fn mount(doc: &Document) -> Result<Self, GameError> {
        let canvas: HtmlCanvasElement = match doc.get_element_by_id("sr-canvas") {
            Some(el) => el.dyn_into().map_err(|_| GameError::Dom("#sr-canvas is not a canvas".into()))?,
            None => {
                let c: HtmlCanvasElement = doc
                    .create_element("canvas")
                    .map_err(GameError::dom)?
                    .dyn_into()
                    .map_err(|_| GameError::Dom("canvas element cast".into()))?;
                c.set_id("sr-canvas");
                c.set_width(CANVAS_W);
                c.set_height(CANVAS_H);
                c.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); border-radius:18px; border:2px solid #222; background:#1b1a22; box-shadow:0 0 32px 0 rgba(0,0,0,0.18); z-index:20;").ok();
                body(doc)?.append_child(&c).map_err(GameError::dom)?;
                c
            }
        };
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(GameError::dom)?
            .ok_or_else(|| GameError::Dom("2d context unavailable".into()))?
            .dyn_into()
            .map_err(|_| GameError::Dom("2d context cast".into()))?;
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");

        let hud = overlay_div(doc, "sr-hud", "position:fixed; top:10px; left:50%; transform:translateX(-50%); width:760px; font-family:'Fira Code', monospace; font-size:18px; padding:6px 12px; background:rgba(0,0,0,0.42); border:1px solid #333; border-radius:6px; color:#ffd166; z-index:45;")?;
        let overlay = overlay_div(doc, "sr-overlay", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); min-width:420px; text-align:center; font-family:'Noto Serif SC', serif; padding:24px; background:rgba(20,20,28,0.92); border:2px solid #333; border-radius:18px; color:#fff; z-index:50;")?;
        let notice = overlay_div(doc, "sr-notice", "position:fixed; bottom:24px; left:50%; transform:translateX(-50%); font-family:'Fira Code', monospace; font-size:15px; padding:6px 12px; background:rgba(120,20,20,0.85); border:1px solid #633; border-radius:6px; color:#fff; z-index:60; display:none;")?;

        Ok(Self {
            doc: doc.clone(),
            canvas,
            ctx,
            hud,
            overlay,
            notice,
            overlay_key: None,
            on_start: Closure::wrap(Box::new(|_evt: web_sys::MouseEvent| {
                super::post(GameEvent::Start(None));
            }) as Box<dyn FnMut(_)>),
        })
    }

    fn draw_lane(&self, notes: &[Note], zone: (f64, f64)) {
        let ctx = &self.ctx;
        let w = self.canvas.width() as f64;
        ctx.set_fill_style_str("rgba(255,255,255,0.06)");
        ctx.fill_rect(0.0, LANE_TOP, w, LANE_H);

        ctx.set_fill_style_str("rgba(120,200,255,0.18)");
        ctx.fill_rect(zone.0, LANE_TOP, zone.1 - zone.0, LANE_H);
        ctx.set_stroke_style_str("rgba(120,200,255,0.55)");
        ctx.set_line_width(2.0);
        line(ctx, zone.0, LANE_TOP, zone.0, LANE_TOP + LANE_H);
        line(ctx, zone.1, LANE_TOP, zone.1, LANE_TOP + LANE_H);
        ctx.set_font("12px 'Fira Code', monospace");
        ctx.set_fill_style_str("rgba(120,200,255,0.75)");
        ctx.fill_text("HIT ZONE", (zone.0 + zone.1) / 2.0, LANE_TOP + LANE_H - 10.0)
            .ok();

        ctx.set_font("34px 'Fira Code', monospace");
        let cy = LANE_TOP + LANE_H / 2.0;
        for note in notes
            .iter()
            .filter(|n| n.position > DRAW_MIN_X && n.position < DRAW_MAX_X)
        {
            let (glyph, color) = match note.state() {
                NoteState::Pending => (note.kind.arrow(), "#ffd166"),
                NoteState::Hit => ("✓", "#4ade80"),
                NoteState::Missed => ("✗", "#f87171"),
            };
            // positions are the note's left edge
            let cx = note.position + 20.0;
            ctx.set_fill_style_str(color);
            ctx.fill_text(glyph, cx, cy).ok();
        }
    }

    fn draw_swing(&self, swing: Option<Direction>) {
        let ctx = &self.ctx;
        let angle = match swing {
            Some(Direction::Left) => -15f64.to_radians(),
            Some(Direction::Right) => 15f64.to_radians(),
            None => 0.0,
        };
        let pivot_x = self.canvas.width() as f64 / 2.0;
        let pivot_y = 20.0;

        ctx.save();
        ctx.translate(pivot_x, pivot_y).ok();
        ctx.rotate(angle).ok();
        ctx.set_stroke_style_str("#ca8a04");
        ctx.set_line_width(4.0);
        line(ctx, -20.0, 0.0, -20.0, 180.0);
        line(ctx, 20.0, 0.0, 20.0, 180.0);
        ctx.set_fill_style_str("#a16207");
        ctx.fill_rect(-48.0, 178.0, 96.0, 10.0);
        // rider
        ctx.set_fill_style_str("#f5d0a9");
        ctx.begin_path();
        ctx.arc(0.0, 120.0, 22.0, 0.0, std::f64::consts::TAU).ok();
        ctx.fill();
        ctx.set_fill_style_str("#60a5fa");
        ctx.fill_rect(-18.0, 142.0, 36.0, 38.0);
        ctx.restore();
    }

    fn update_hud(&self, scene: &Scene<'_>) {
        let f = &scene.frame;
        if f.state != GameState::Playing {
            self.hud.set_attribute("style", &hidden(&self.hud)).ok();
            return;
        }
        let pct = (f.time_ratio * 100.0).round();
        let html = format!(
            "<div style='display:flex; justify-content:space-between;'>\
             <span>Score: {}</span><span>Combo: {}</span><span style='color:#f87171'>Misses: {}</span></div>\
             <div style='text-align:center; margin:4px 0; color:#ddd'>♪ Now Playing: {}</div>\
             <div style='height:8px; background:#333; border-radius:4px;'>\
             <div style='height:8px; width:{}%; background:#ffd166; border-radius:4px;'></div></div>\
             <div style='text-align:center; font-size:13px; color:#aaa'>Time Left: {}s</div>",
            f.board.score,
            f.board.combo,
            f.board.misses,
            f.song_name.unwrap_or("Loading..."),
            pct,
            f.time_left.ceil(),
        );
        self.hud.set_inner_html(&html);
        self.hud.set_attribute("style", &shown(&self.hud)).ok();
    }

    fn update_overlay(&mut self, state: GameState, summary: Option<&GameSummary>) -> Result<(), GameError> {
        let key = match (state, summary) {
            (GameState::Playing, _) => None,
            (GameState::GameOver, Some(s)) => Some(format!("over:{}:{}", s.reason.as_str(), s.score)),
            _ => Some("initial".to_string()),
        };
        if key == self.overlay_key {
            return Ok(());
        }
        self.overlay_key = key;

        if self.overlay_key.is_none() {
            self.overlay.set_attribute("style", &hidden(&self.overlay)).ok();
            self.overlay.set_inner_html("");
            return Ok(());
        }

        let html = match summary {
            Some(s) if state == GameState::GameOver => format!(
                "<h2 style='font-size:34px; margin:8px 0; color:#ffd166'>{}</h2>\
                 <p style='color:#bbb'>{}</p>\
                 <p style='font-size:24px'>Final Score: <b>{}</b></p>\
                 <p>Hits: {} / {} &nbsp; Accuracy: {}% &nbsp; Max Combo: {}</p>\
                 <button id='{START_BUTTON_ID}' style='font-size:20px; padding:8px 24px; border-radius:12px;'>Play Again</button>",
                s.title(),
                s.song_name,
                s.score,
                s.hits,
                s.total_notes,
                s.accuracy,
                s.max_combo,
            ),
            _ => format!(
                "<h2 style='font-size:30px; margin:8px 0; color:#ffd166'>Ready to Swing?</h2>\
                 <p>Use Left &amp; Right Arrow keys to hit the notes!</p>\
                 <button id='{START_BUTTON_ID}' style='font-size:20px; padding:8px 24px; border-radius:12px;'>Start Playing</button>"
            ),
        };
        self.overlay.set_inner_html(&html);
        self.overlay.set_attribute("style", &shown(&self.overlay)).ok();
        let button = self
            .doc
            .get_element_by_id(START_BUTTON_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .ok_or_else(|| GameError::Dom("start button missing".into()))?;
        button.set_onclick(Some(self.on_start.as_ref().unchecked_ref()));
        Ok(())
    }

    fn update_notice(&self, notice: Option<&str>) {
        match notice {
            Some(text) => {
                self.notice.set_text_content(Some(text));
                self.notice.set_attribute("style", &shown(&self.notice)).ok();
            }
            None => {
                self.notice.set_attribute("style", &hidden(&self.notice)).ok();
            }
        }
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), GameError> {
        let w = self.canvas.width() as f64;
        let h = self.canvas.height() as f64;
        self.ctx.set_fill_style_str("#1b1a22");
        self.ctx.fill_rect(0.0, 0.0, w, h);

        self.draw_swing(scene.swing);
        self.draw_lane(scene.frame.notes, scene.frame.zone);
        self.update_hud(scene);
        self.update_overlay(scene.frame.state, scene.summary.as_ref())?;
        self.update_notice(scene.notice);
        Ok(())
    }
}

fn body(doc: &Document) -> Result<web_sys::HtmlElement, GameError> {
    doc.body().ok_or_else(|| GameError::Dom("no body".into()))
}

fn overlay_div(doc: &Document, id: &str, style: &str) -> Result<Element, GameError> {
    if let Some(el) = doc.get_element_by_id(id) {
        return Ok(el);
    }
    let div = doc.create_element("div").map_err(GameError::dom)?;
    div.set_id(id);
    div.set_attribute("style", style).ok();
    div.set_attribute("data-base-style", style).ok();
    body(doc)?.append_child(&div).map_err(GameError::dom)?;
    Ok(div)
}

fn base_style(el: &Element) -> String {
    el.get_attribute("data-base-style").unwrap_or_default().replace("display:none;", "")
}

fn shown(el: &Element) -> String {
    base_style(el)
}

fn hidden(el: &Element) -> String {
    format!("{} display:none;", base_style(el))
}

fn line(ctx: &CanvasRenderingContext2d, x1: f64, y1: f64, x2: f64, y2: f64) {
    ctx.begin_path();
    ctx.move_to(x1, y1);
    ctx.line_to(x2, y2);
    ctx.stroke();
}
