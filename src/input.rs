// stdin is read byte by byte on its own thread and decoded between ticks.
// arrow keys are 3 bytes long (27, 91, 65..68), a mouse drag is reported as
// an SGR sequence: ESC [ < button ; column ; row (M on press/motion, m on release)
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use circular_buffer::CircularBuffer;
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW};

use crate::snake::Direction;

type InputBuffer = CircularBuffer<1024, u8>; // 1024 bytes in input buffer

const STDIN_FD: i32 = 0;
const ESC: u8 = 27;
// an unterminated mouse report longer than this is garbage
const MAX_MOUSE_SEQUENCE: usize = 32;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const ENABLE_MOUSE_DRAG: &str = "\x1b[?1002h\x1b[?1006h";
const DISABLE_MOUSE_DRAG: &str = "\x1b[?1006l\x1b[?1002l";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Turn(Direction),
    Restart,
    Quit,
}

/// Puts stdin in non canonical, no echo mode until dropped.
pub struct RawTerminal {
    original: Termios,
}

impl RawTerminal {
    pub fn enable() -> io::Result<Self> {
        let original = Termios::from_fd(STDIN_FD)?;
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(STDIN_FD, TCSANOW, &raw)?;

        let mut out = io::stdout();
        write!(out, "{}{}", HIDE_CURSOR, ENABLE_MOUSE_DRAG)?;
        out.flush()?;
        Ok(RawTerminal { original })
    }
}

impl Drop for RawTerminal {
    fn drop(&mut self) {
        let mut out = io::stdout();
        let _ = write!(out, "{}{}", DISABLE_MOUSE_DRAG, SHOW_CURSOR);
        let _ = out.flush();
        if let Err(e) = tcsetattr(STDIN_FD, TCSANOW, &self.original) {
            log::error!("Failed to restore terminal settings: {}", e);
        }
    }
}

pub fn spawn_stdin_channel() -> Receiver<u8> {
    let (tx, rx) = mpsc::channel::<u8>();
    thread::spawn(move || {
        let mut reader = io::stdin();
        let mut buffer: [u8; 1] = [0; 1];
        loop {
            if let Err(e) = reader.read_exact(&mut buffer) {
                log::error!("Stopped reading stdin: {}", e);
                break;
            }
            if tx.send(buffer[0]).is_err() {
                break;
            }
        }
    });
    rx
}

/// Turns a drag into the direction of its dominant axis.
#[derive(Debug, Default, Clone)]
pub struct SwipeTracker {
    origin: Option<(i32, i32)>,
}

impl SwipeTracker {
    pub fn start(&mut self, x: i32, y: i32) {
        self.origin = Some((x, y));
    }

    pub fn end(&mut self) {
        self.origin = None;
    }

    pub fn move_to(&mut self, x: i32, y: i32) -> Option<Direction> {
        let Some((start_x, start_y)) = self.origin.replace((x, y)) else {
            return None;
        };
        let (dx, dy) = (x - start_x, y - start_y);
        if dx == 0 && dy == 0 {
            return None;
        }
        let direction = if dx.abs() > dy.abs() {
            if dx > 0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy > 0 {
            Direction::Down
        } else {
            Direction::Up
        };
        Some(direction)
    }
}

// the last byte of ESC [ A..D, named the way keyboards name the keys
fn arrow_key_name(byte: u8) -> Option<&'static str> {
    match byte {
        b'A' => Some("ArrowUp"),
        b'B' => Some("ArrowDown"),
        b'C' => Some("ArrowRight"),
        b'D' => Some("ArrowLeft"),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MouseReport {
    button: i32,
    column: i32,
    row: i32,
    released: bool,
}

enum MouseParse {
    Incomplete,
    Invalid,
    Report(MouseReport),
}

pub struct InputDecoder {
    buffer: InputBuffer,
    swipe: SwipeTracker,
}

impl Default for InputDecoder {
    fn default() -> Self {
        InputDecoder::new()
    }
}

impl InputDecoder {
    pub fn new() -> Self {
        InputDecoder {
            buffer: InputBuffer::new(),
            swipe: SwipeTracker::default(),
        }
    }

    pub fn push(&mut self, byte: u8) {
        // if the buffer is full, ignore the input
        if self.buffer.is_full() {
            log::trace!("Input buffer full, dropping byte {}", byte);
            return;
        }
        self.buffer.push_back(byte);
    }

    fn consume(&mut self, count: usize) {
        for _ in 0..count {
            self.buffer.pop_front();
        }
    }

    /// Decodes the next complete event. Incomplete sequences stay buffered.
    pub fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            let first = *self.buffer.front()?;
            match first {
                ESC => {
                    let second = *self.buffer.nth_front(1)?;
                    if second != b'[' {
                        // lone escape, not a sequence
                        self.consume(1);
                        continue;
                    }
                    let third = *self.buffer.nth_front(2)?;
                    if let Some(key) = arrow_key_name(third) {
                        self.consume(3);
                        match key.parse::<Direction>() {
                            Ok(direction) => return Some(InputEvent::Turn(direction)),
                            Err(e) => {
                                log::trace!("{}", e);
                                continue;
                            }
                        }
                    }
                    if third != b'<' {
                        self.consume(1);
                        continue;
                    }
                    match self.take_mouse_report() {
                        MouseParse::Incomplete => return None,
                        MouseParse::Invalid => continue,
                        MouseParse::Report(report) => {
                            if let Some(direction) = self.handle_mouse(report) {
                                return Some(InputEvent::Turn(direction));
                            }
                        }
                    }
                }
                b'r' | b'R' | b'\n' | b'\r' => {
                    self.consume(1);
                    return Some(InputEvent::Restart);
                }
                b'q' | b'Q' => {
                    self.consume(1);
                    return Some(InputEvent::Quit);
                }
                other => {
                    log::trace!("Ignoring input byte {}", other);
                    self.consume(1);
                }
            }
        }
    }

    fn take_mouse_report(&mut self) -> MouseParse {
        let terminator = self
            .buffer
            .iter()
            .enumerate()
            .skip(3)
            .find(|(_, b)| **b == b'M' || **b == b'm')
            .map(|(i, b)| (i, *b));

        let Some((end, last)) = terminator else {
            if self.buffer.len() > MAX_MOUSE_SEQUENCE {
                self.consume(1);
                return MouseParse::Invalid;
            }
            return MouseParse::Incomplete;
        };

        let body: String = self
            .buffer
            .iter()
            .skip(3)
            .take(end - 3)
            .map(|b| *b as char)
            .collect();
        self.consume(end + 1);

        // terminals report at most u16 sized coordinates, anything bigger is garbage
        let fields: Vec<u16> = match body.split(';').map(|f| f.parse::<u16>()).collect() {
            Ok(fields) => fields,
            Err(_) => return MouseParse::Invalid,
        };
        match fields.as_slice() {
            [button, column, row] => MouseParse::Report(MouseReport {
                button: i32::from(*button),
                column: i32::from(*column),
                row: i32::from(*row),
                released: last == b'm',
            }),
            _ => MouseParse::Invalid,
        }
    }

    fn handle_mouse(&mut self, report: MouseReport) -> Option<Direction> {
        // wheel and extra buttons
        if report.button >= 64 {
            return None;
        }
        if report.released {
            self.swipe.end();
            return None;
        }
        // a character cell is about twice as tall as it is wide
        let (x, y) = (report.column, report.row * 2);
        if report.button & 32 != 0 {
            self.swipe.move_to(x, y)
        } else {
            self.swipe.start(x, y);
            None
        }
    }
}
