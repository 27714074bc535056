pub mod pcm_wav_decoder;
