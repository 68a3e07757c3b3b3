//! Analog path: simulated select lines and ADC feeding the server.

use crate::mock_hw::*;

use sliderbridge::adapters::analog::MuxAnalogReader;
use sliderbridge::app::guardian::MemoryGuardian;
use sliderbridge::app::sampler::Sampler;
use sliderbridge::app::server::BridgeServer;
use sliderbridge::drivers::hw_init::{SelectLine, SliderAdc, init_peripherals, sim_set_adc};
use sliderbridge::pins::SELECT_GPIOS;

fn analog_reader(trace: &Trace) -> MuxAnalogReader<SelectLine, SliderAdc, TraceDelay> {
    let selects = SELECT_GPIOS.iter().map(|&g| SelectLine::new(g)).collect();
    MuxAnalogReader::new(selects, SliderAdc, TraceDelay::new(trace), 10, 1023)
}

// The simulated ADC is a process-wide static, so everything touching it
// lives in this one test.
#[test]
fn simulated_pots_stream_through_the_server() {
    init_peripherals(&SELECT_GPIOS).unwrap();

    let settle_trace = new_trace();
    let mut reader = analog_reader(&settle_trace);

    sim_set_adc(700);
    let mut sampler = Sampler::new(reader, 3);
    let snap = sampler.sample_all();
    assert!(snap.dirty);
    assert_eq!(snap.values.as_slice(), &[700, 700, 700]);

    sim_set_adc(4000);
    let snap = sampler.sample_all();
    assert_eq!(snap.values.as_slice(), &[1023, 1023, 1023]);

    reader = analog_reader(&settle_trace);
    sim_set_adc(321);
    let wire_trace = new_trace();
    let listener = MockListener::new().with_client(MockConnection::new(1, &wire_trace, 2), peer(50_000));
    let mut srv = BridgeServer::new(
        listener,
        Sampler::new(reader, 3),
        MemoryGuardian::new(102_000),
        FakeHeap::new(150_000),
        TraceDelay::new(&wire_trace),
        RecordingSink::default(),
        10,
    );
    srv.run_once();

    assert_eq!(frames_for(&wire_trace, 1), vec!["321|321|321\r\n"]);
    assert!(
        srv.sampler()
            .channels()
            .iter()
            .all(|c| c.last_value == 321)
    );
}

#[test]
fn select_lines_are_left_low_after_each_read() {
    use sliderbridge::app::ports::ChannelReader;

    let trace = new_trace();
    let mut reader = analog_reader(&trace);
    for i in 0..SELECT_GPIOS.len() {
        reader.read_channel(i);
    }
    assert!(reader.selects().iter().all(|line| !line.is_high()));
    // One settle wait per channel.
    assert_eq!(delay_count(&trace), SELECT_GPIOS.len());
}
