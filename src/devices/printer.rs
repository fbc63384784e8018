//! Printer handler — ports 2 (status) and 3 (data).

/// Sink for bytes written to the emulated printer.
pub trait PrinterSink: Send {
    fn write(&mut self, byte: u8);
}

/// Printer sink that just accumulates bytes, useful for tests and hosts
/// that want to inspect printed output directly.
#[derive(Default)]
pub struct BufferSink {
    pub bytes: Vec<u8>,
}

impl PrinterSink for BufferSink {
    fn write(&mut self, byte: u8) {
        self.bytes.push(byte);
    }
}

/// Printer device: always ready, forwards output bytes to its sink.
pub struct Printer {
    sink: Box<dyn PrinterSink>,
}

impl Printer {
    pub fn new() -> Self {
        Self { sink: Box::new(BufferSink::default()) }
    }

    pub fn with_sink(sink: Box<dyn PrinterSink>) -> Self {
        Self { sink }
    }

    pub fn set_sink(&mut self, sink: Box<dyn PrinterSink>) {
        self.sink = sink;
    }

    pub fn in_port(&mut self, port: u8) -> u8 {
        match port {
            2 => 0xFF,
            3 => 0x1A,
            _ => 0xFF,
        }
    }

    pub fn out_port(&mut self, port: u8, value: u8) {
        if port == 3 {
            self.sink.write(value);
        }
    }
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct SharedSink(Arc<Mutex<Vec<u8>>>);

    impl PrinterSink for SharedSink {
        fn write(&mut self, byte: u8) {
            self.0.lock().unwrap().push(byte);
        }
    }

    #[test]
    fn status_always_ready_and_eof_on_input() {
        let mut p = Printer::new();
        assert_eq!(p.in_port(2), 0xFF);
        assert_eq!(p.in_port(3), 0x1A);
    }

    #[test]
    fn data_out_forwards_to_sink() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let mut p = Printer::with_sink(Box::new(SharedSink(captured.clone())));
        p.out_port(3, b'Q');
        p.out_port(3, b'R');
        p.out_port(2, 0xFF); // status write is a no-op, ignored
        assert_eq!(*captured.lock().unwrap(), vec![b'Q', b'R']);
    }
}
